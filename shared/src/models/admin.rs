//! Admin Model

use serde::{Deserialize, Serialize};

use super::{AssetRef, Role};

/// Admin entity as stored
///
/// `role` holds the referenced role id; `password` is an Argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetRef>,
    /// Role reference (String ID)
    pub role: String,
}

/// Admin response (without password, role populated)
///
/// Also the public profile returned by login and check-session. A role that
/// no longer resolves renders as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetRef>,
    pub role: Option<Role>,
}

impl AdminResponse {
    pub fn new(admin: Admin, role: Option<Role>) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            image: admin.image,
            role,
        }
    }
}

/// Create admin payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Role reference (String ID)
    pub role: String,
}

/// Update admin payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
