//! Single-record write responses
//!
//! Create and update answer `{"message": "...", "<table>": {...}}`, keyed by
//! the entity's table name so clients read `body.product` or `body.role`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct EntityEnvelope<T> {
    status: StatusCode,
    message: String,
    key: &'static str,
    entity: T,
}

impl<T> EntityEnvelope<T> {
    /// 201 for a newly created record
    pub fn created(key: &'static str, label: &str, entity: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: format!("{label} created successfully"),
            key,
            entity,
        }
    }

    pub fn updated(key: &'static str, label: &str, entity: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: format!("{label} updated successfully"),
            key,
            entity,
        }
    }
}

impl<T: Serialize> EntityEnvelope<T> {
    fn body(&self) -> Result<Value, serde_json::Error> {
        let mut body = Map::new();
        body.insert("message".into(), Value::String(self.message.clone()));
        body.insert(self.key.into(), serde_json::to_value(&self.entity)?);
        Ok(Value::Object(body))
    }
}

impl<T: Serialize> IntoResponse for EntityEnvelope<T> {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(body) => (self.status, Json(body)).into_response(),
            Err(e) => crate::AppError::internal(format!("Failed to serialize {}: {e}", self.key))
                .into_response(),
        }
    }
}
