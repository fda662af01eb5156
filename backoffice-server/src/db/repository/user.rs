//! User descriptor

use serde_json::Value;
use shared::error::{AppResult, ErrorCode};
use shared::models::{AssetRef, User, UserCreate, UserUpdate};

use super::entity::{Document, Entity, to_document};
use crate::auth::password::hash_password;
use crate::utils::validation::{
    Field, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN, Rule, Schema,
};

pub const TABLE: &str = "user";

/// Account fields shared by users and admins
pub(super) const USERNAME: Field = Field::new("username", Rule::Letters { min: MIN_USERNAME_LEN });
pub(super) const EMAIL: Field = Field::new("email", Rule::Email);
pub(super) const PASSWORD: Field = Field::new(
    "password",
    Rule::Secret {
        min: MIN_PASSWORD_LEN,
        max: MAX_PASSWORD_LEN,
    },
);

/// Replace the plaintext `password` entry with its hash, if present
pub(super) fn hash_password_field(document: &mut Document) -> AppResult<()> {
    if let Some(Value::String(plain)) = document.get("password") {
        let hashed = hash_password(plain)?;
        document.insert("password".into(), Value::String(hashed));
    }
    Ok(())
}

impl Entity for User {
    type Create = UserCreate;
    type Update = UserUpdate;

    const TABLE: &'static str = TABLE;
    const LABEL: &'static str = "User";
    const SCHEMA: &'static Schema = &Schema {
        fields: &[USERNAME, EMAIL, PASSWORD],
        strict_update: false,
    };
    const UNIQUE_KEYS: &'static [&'static str] = &["username", "email"];
    const NOT_FOUND: ErrorCode = ErrorCode::UserNotFound;
    const CONFLICT: ErrorCode = ErrorCode::AccountExists;
    const TIMESTAMPS: bool = true;
    const HAS_IMAGE: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn image(&self) -> Option<&AssetRef> {
        self.image.as_ref()
    }

    fn create_document(input: UserCreate) -> AppResult<Document> {
        let mut document = to_document(&input)?;
        hash_password_field(&mut document)?;
        Ok(document)
    }

    fn update_document(input: UserUpdate) -> AppResult<Document> {
        let mut document = to_document(&input)?;
        hash_password_field(&mut document)?;
        Ok(document)
    }
}
