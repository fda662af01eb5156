//! Category descriptor
//!
//! `count` is maintained by product writes and is never accepted from clients.

use serde_json::Value;
use shared::error::{AppResult, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use super::entity::{Document, Entity, ReferencedBy, to_document};
use crate::utils::validation::{Field, MAX_NAME_LEN, Rule, Schema};

pub const TABLE: &str = "category";

/// Counter field tracking how many products reference the category
pub const COUNT_FIELD: &str = "count";

impl Entity for Category {
    type Create = CategoryCreate;
    type Update = CategoryUpdate;

    const TABLE: &'static str = TABLE;
    const LABEL: &'static str = "Category";
    const SCHEMA: &'static Schema = &Schema {
        fields: &[Field::new("name", Rule::Text { min: 2, max: MAX_NAME_LEN })],
        strict_update: true,
    };
    const UNIQUE_KEYS: &'static [&'static str] = &["name"];
    const REFERENCED_BY: &'static [ReferencedBy] = &[ReferencedBy {
        table: super::product::TABLE,
        field: "category",
        in_use: ErrorCode::CategoryHasProducts,
    }];
    const NOT_FOUND: ErrorCode = ErrorCode::CategoryNotFound;
    const CONFLICT: ErrorCode = ErrorCode::CategoryNameExists;

    fn id(&self) -> &str {
        &self.id
    }

    fn create_document(input: CategoryCreate) -> AppResult<Document> {
        let mut document = to_document(&input)?;
        document.insert(COUNT_FIELD.into(), Value::from(0));
        Ok(document)
    }

    fn update_document(input: CategoryUpdate) -> AppResult<Document> {
        to_document(&input)
    }
}
