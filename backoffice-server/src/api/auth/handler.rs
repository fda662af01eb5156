//! Authentication Handlers
//!
//! Handles login, logout and session checks

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use http::header::SET_COOKIE;
use serde_json::Value;

use crate::api::payload::Payload;
use crate::auth::SessionToken;
use crate::auth::cookie::{clear_cookie, session_cookie};
use crate::core::ServerState;
use crate::db::repository::admin;
use crate::utils::validation::{MAX_EMAIL_LEN, MAX_PASSWORD_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, SessionStatus};

/// Text field of the login body, `""` when absent or not a string
fn text_field(payload: &Payload, name: &str) -> String {
    payload
        .fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_login(payload: &Payload) -> AppResult<LoginRequest> {
    let request = LoginRequest {
        email: text_field(payload, "email").trim().to_string(),
        password: text_field(payload, "password"),
    };
    validate_required_text(&request.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&request.password, "password", MAX_PASSWORD_LEN)?;
    Ok(request)
}

/// Login handler
///
/// Authenticates the admin by email and opens a session delivered as a cookie
pub async fn login(
    State(state): State<ServerState>,
    token: SessionToken,
    payload: Payload,
) -> AppResult<impl IntoResponse> {
    if state.auth.current(token.as_deref()).await?.is_some() {
        return Err(AppError::new(ErrorCode::AlreadyLoggedIn));
    }

    let request = parse_login(&payload)?;
    let (token, admin) = state.auth.login(&request.email, &request.password).await?;

    tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin logged in successfully");

    let cookie = session_cookie(state.auth.config(), &token, state.config.is_production());
    let admin = admin::with_role(&state.db, admin).await?;
    let response = LoginResponse {
        message: "Login successful".to_string(),
        admin_id: admin.id.clone(),
        admin,
    };

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(response)))
}

/// Logout handler
///
/// Always succeeds; the cookie is cleared whether or not a session existed
pub async fn logout(
    State(state): State<ServerState>,
    token: SessionToken,
) -> AppResult<impl IntoResponse> {
    state.auth.logout(token.as_deref()).await?;

    let cookie = clear_cookie(state.auth.config(), state.config.is_production());
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        ApiResponse::message("Logout successful"),
    ))
}

/// Session status of the calling cookie
pub async fn check_session(
    State(state): State<ServerState>,
    token: SessionToken,
) -> AppResult<Json<SessionStatus>> {
    let status = match state.auth.current(token.as_deref()).await? {
        Some(admin) => SessionStatus::authenticated(admin::with_role(&state.db, admin).await?),
        None => SessionStatus::anonymous(),
    };
    Ok(Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload {
            fields: value.as_object().cloned().unwrap_or_default(),
            image: None,
        }
    }

    #[test]
    fn test_parse_login_trims_email() {
        let request = parse_login(&payload(json!({"email": " admin@example.com ", "password": "Secret123"}))).unwrap();
        assert_eq!(request.email, "admin@example.com");
        assert_eq!(request.password, "Secret123");
    }

    #[test]
    fn test_parse_login_requires_both_fields() {
        let err = parse_login(&payload(json!({"email": "admin@example.com"}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = parse_login(&payload(json!({"password": 12345678}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
