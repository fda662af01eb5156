//! Session Extractors
//!
//! - [`SessionToken`] - 原始 Cookie 令牌 (可能为空，从不拒绝)
//! - [`CurrentAdmin`] - 已登录管理员，未登录时返回 401

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::Admin;

use super::cookie;
use crate::AppError;
use crate::core::ServerState;
use crate::security_log;

/// Session cookie value, if the request carries one
#[derive(Debug, Clone, Default)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<ServerState> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(cookie::read_token(
            &parts.headers,
            &state.config.session.cookie_name,
        )))
    }
}

/// Admin behind a live session
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

impl FromRequestParts<ServerState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(admin) = parts.extensions.get::<CurrentAdmin>() {
            return Ok(admin.clone());
        }

        let token = cookie::read_token(&parts.headers, &state.config.session.cookie_name);
        match state.auth.current(token.as_deref()).await? {
            Some(admin) => {
                let current = CurrentAdmin(admin);
                parts.extensions.insert(current.clone());
                Ok(current)
            }
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::not_authenticated())
            }
        }
    }
}
