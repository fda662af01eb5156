//! Unified error codes for the back-office
//!
//! This module defines all error codes used by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Role errors
//! - 3xxx: Account errors (users and admins)
//! - 6xxx: Catalog errors (categories and products)
//! - 7xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Foreign key does not resolve
    InvalidReference = 6,
    /// Resource is still referenced by other records
    ReferenceInUse = 7,

    // ==================== 1xxx: Auth ====================
    /// Admin is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Session has expired
    SessionExpired = 1005,
    /// A live session already exists for this client
    AlreadyLoggedIn = 1008,

    // ==================== 2xxx: Role ====================
    /// Role not found
    RoleNotFound = 2001,
    /// Role name already exists
    RoleNameExists = 2002,
    /// Role is assigned to admins
    RoleInUse = 2003,
    /// Referenced role does not exist
    RoleInvalid = 2004,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Username or email already taken
    AccountExists = 3002,
    /// Admin not found
    AdminNotFound = 3101,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has products
    CategoryHasProducts = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Referenced category does not exist
    CategoryInvalid = 6104,

    // ==================== 7xxx: Upload ====================
    /// Uploaded file is empty
    EmptyFile = 7001,
    /// Uploaded file exceeds the size limit
    FileTooLarge = 7002,
    /// Unsupported file format
    UnsupportedFileFormat = 7003,
    /// File could not be decoded as an image
    InvalidImage = 7004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Image host request failed
    ImageHostError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidReference => "Invalid reference",
            ErrorCode::ReferenceInUse => "Resource is still referenced",

            // Auth
            ErrorCode::NotAuthenticated => "Admin is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AlreadyLoggedIn => "Admin is already logged in!",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role already exists!",
            ErrorCode::RoleInUse => "Role is assigned to admins",
            ErrorCode::RoleInvalid => "Invalid role specified",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::AccountExists => "Username or email already exists",
            ErrorCode::AdminNotFound => "Admin not found",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category still has products",
            ErrorCode::CategoryNameExists => "Category already exists!",
            ErrorCode::CategoryInvalid => "Invalid category specified",

            // Upload
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImage => "Invalid image file",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ImageHostError => "Image host request failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown numeric value into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidReference),
            7 => Ok(ErrorCode::ReferenceInUse),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionExpired),
            1008 => Ok(ErrorCode::AlreadyLoggedIn),

            // Role
            2001 => Ok(ErrorCode::RoleNotFound),
            2002 => Ok(ErrorCode::RoleNameExists),
            2003 => Ok(ErrorCode::RoleInUse),
            2004 => Ok(ErrorCode::RoleInvalid),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::AccountExists),
            3101 => Ok(ErrorCode::AdminNotFound),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasProducts),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6104 => Ok(ErrorCode::CategoryInvalid),

            // Upload
            7001 => Ok(ErrorCode::EmptyFile),
            7002 => Ok(ErrorCode::FileTooLarge),
            7003 => Ok(ErrorCode::UnsupportedFileFormat),
            7004 => Ok(ErrorCode::InvalidImage),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::ImageHostError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::InvalidReference.code(), 6);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::RoleNotFound.code(), 2001);
        assert_eq!(ErrorCode::AccountExists.code(), 3002);
        assert_eq!(ErrorCode::CategoryNameExists.code(), 6103);
        assert_eq!(ErrorCode::FileTooLarge.code(), 7002);
        assert_eq!(ErrorCode::ImageHostError.code(), 9004);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1008), Ok(ErrorCode::AlreadyLoggedIn));
        assert_eq!(ErrorCode::try_from(6104), Ok(ErrorCode::CategoryInvalid));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::AdminNotFound).unwrap();
        assert_eq!(json, "3101");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("2002").unwrap();
        assert_eq!(code, ErrorCode::RoleNameExists);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::InvalidCredentials.message(), "Invalid credentials");
        assert_eq!(
            ErrorCode::AccountExists.message(),
            "Username or email already exists"
        );
        assert_eq!(ErrorCode::CategoryInvalid.message(), "Invalid category specified");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::ProductNotFound), "6001");
        assert_eq!(
            format!("{}", InvalidErrorCode(77)),
            "Invalid error code: 77"
        );
    }
}
