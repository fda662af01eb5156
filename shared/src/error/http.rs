//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Uniqueness conflicts stay on 400 like every other rejected write;
    /// only unresolvable ids get 404.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RoleNotFound
            | Self::UserNotFound
            | Self::AdminNotFound
            | Self::CategoryNotFound
            | Self::ProductNotFound => StatusCode::NOT_FOUND,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::InvalidCredentials | Self::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ImageHostError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, reference, conflict, upload)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
