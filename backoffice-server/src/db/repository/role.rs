//! Role descriptor

use shared::error::{AppResult, ErrorCode};
use shared::models::{Role, RoleCreate, RoleStatus, RoleUpdate};

use super::entity::{Document, Entity, ReferencedBy, to_document};
use crate::utils::validation::{Field, MAX_NAME_LEN, Rule, Schema};

pub const TABLE: &str = "role";

impl Entity for Role {
    type Create = RoleCreate;
    type Update = RoleUpdate;

    const TABLE: &'static str = TABLE;
    const LABEL: &'static str = "Role";
    const SCHEMA: &'static Schema = &Schema {
        fields: &[
            Field::new("name", Rule::Text { min: 3, max: MAX_NAME_LEN }),
            Field::new("status", Rule::OneOf(RoleStatus::VALUES)),
            Field::new("limit", Rule::Integer { min: None }),
        ],
        strict_update: true,
    };
    const UNIQUE_KEYS: &'static [&'static str] = &["name"];
    const REFERENCED_BY: &'static [ReferencedBy] = &[ReferencedBy {
        table: super::admin::TABLE,
        field: "role",
        in_use: ErrorCode::RoleInUse,
    }];
    const NOT_FOUND: ErrorCode = ErrorCode::RoleNotFound;
    const CONFLICT: ErrorCode = ErrorCode::RoleNameExists;

    fn id(&self) -> &str {
        &self.id
    }

    fn create_document(input: RoleCreate) -> AppResult<Document> {
        to_document(&input)
    }

    fn update_document(input: RoleUpdate) -> AppResult<Document> {
        to_document(&input)
    }
}
