//! Request payload extractor
//!
//! Create and update endpoints accept either a JSON object or a
//! `multipart/form-data` form with text fields plus an optional `image`
//! file. URL-encoded forms are accepted too. All arrive as one
//! [`Payload`]: raw fields for the schema validator and the file, if any.

use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

use crate::db::repository::Document;
use crate::services::UploadedImage;
use crate::utils::AppError;

/// Multipart field carrying the image file
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct Payload {
    pub fields: Document,
    pub image: Option<UploadedImage>,
}

impl Payload {
    /// Drop empty text fields; forms send them for inputs left blank
    pub fn without_blank_fields(mut self) -> Self {
        self.fields
            .retain(|_, value| !matches!(value, Value::String(s) if s.trim().is_empty()));
        self
    }
}

impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::invalid_request(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::invalid_request(e.body_text()))?;
            let fields = pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Payload { fields, image: None });
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::default());
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => Ok(Payload { fields, image: None }),
            Ok(_) => Err(AppError::invalid_request("Request body must be a JSON object")),
            Err(e) => Err(AppError::invalid_request(format!("Invalid JSON body: {e}"))),
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Payload, AppError> {
    let mut payload = Payload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD && field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
            // Browsers send an empty part when no file was chosen
            if !bytes.is_empty() {
                payload.image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        if field.file_name().is_some() {
            tracing::debug!(field = %name, "Ignoring unexpected file field");
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
        payload.fields.insert(name, Value::String(text));
    }

    Ok(payload)
}
