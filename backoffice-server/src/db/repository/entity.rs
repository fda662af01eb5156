//! Entity descriptors
//!
//! An [`Entity`] describes one record family: its table, field schema,
//! unique keys, outgoing references and which tables point back at it.
//! The generic repository and service read these constants instead of
//! carrying per-family CRUD code.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::AssetRef;

use crate::utils::validation::Schema;

pub use crate::utils::validation::Document;

/// Foreign-key style field pointing at another table
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    /// Field holding the referenced id
    pub field: &'static str,
    /// Referenced table
    pub table: &'static str,
    /// Error when the id does not resolve
    pub invalid: ErrorCode,
    /// Counter on the referenced record that tracks how many records point at it
    pub counter: Option<&'static str>,
}

/// Table whose records reference this entity; blocks deletion while any remain
#[derive(Debug, Clone, Copy)]
pub struct ReferencedBy {
    pub table: &'static str,
    pub field: &'static str,
    pub in_use: ErrorCode,
}

/// Record family descriptor
pub trait Entity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Typed create payload, built from the validated document
    type Create: DeserializeOwned + Send;
    /// Typed partial update payload
    type Update: DeserializeOwned + Send;

    /// Table name; also the JSON key wrapping single-record responses
    const TABLE: &'static str;
    /// Human label used in messages ("Product created successfully")
    const LABEL: &'static str;
    const SCHEMA: &'static Schema;
    /// Fields that must be unique across the table
    const UNIQUE_KEYS: &'static [&'static str] = &[];
    const REFERENCES: &'static [Reference] = &[];
    const REFERENCED_BY: &'static [ReferencedBy] = &[];
    const NOT_FOUND: ErrorCode;
    const CONFLICT: ErrorCode = ErrorCode::AlreadyExists;
    /// Maintain `createdAt` / `updatedAt`
    const TIMESTAMPS: bool = false;
    /// Accepts an optional `image` upload
    const HAS_IMAGE: bool = false;

    fn id(&self) -> &str;

    fn image(&self) -> Option<&AssetRef> {
        None
    }

    /// Stored document for a new record (ids and timestamps are added by the caller)
    fn create_document(input: Self::Create) -> AppResult<Document>;

    /// Partial document for an update; only fields present in `input`
    fn update_document(input: Self::Update) -> AppResult<Document>;

    fn not_found() -> AppError {
        AppError::new(Self::NOT_FOUND)
    }
}

/// Serialize a payload struct into a document, dropping `None` fields
pub fn to_document<T: Serialize>(value: &T) -> AppResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::internal("payload did not serialize to an object")),
        Err(e) => Err(AppError::internal(e.to_string())),
    }
}

/// Parse a validated document into a typed payload
pub fn from_document<T: DeserializeOwned>(document: Document) -> AppResult<T> {
    serde_json::from_value(Value::Object(document)).map_err(|e| AppError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Patch {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
    }

    #[test]
    fn test_to_document_skips_absent_fields() {
        let doc = to_document(&Patch {
            name: Some("Latte".into()),
            price: None,
        })
        .unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["name"], "Latte");
    }

    #[test]
    fn test_from_document_rejects_wrong_shape() {
        let mut doc = Document::new();
        doc.insert("price".into(), Value::String("cheap".into()));
        assert!(from_document::<Patch>(doc).is_err());
    }
}
