//! Client-related types shared between server and client
//!
//! Auth request/response types used by the admin session endpoints.

use serde::{Deserialize, Serialize};

use crate::models::AdminResponse;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request (admins log in with their email)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub admin_id: String,
    pub admin: AdminResponse,
}

/// Result of `GET /api/admin/check-session`
///
/// A missing or expired session is a normal negative answer, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminResponse>,
}

impl SessionStatus {
    pub fn anonymous() -> Self {
        Self {
            is_logged_in: false,
            admin_id: None,
            admin: None,
        }
    }

    pub fn authenticated(admin: AdminResponse) -> Self {
        Self {
            is_logged_in: true,
            admin_id: Some(admin.id.clone()),
            admin: Some(admin),
        }
    }
}
