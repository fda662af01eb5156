//! Cloudinary integration via REST API (no SDK dependency)

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared::models::AssetRef;

use super::{ImageHost, ImageHostError};
use crate::core::CloudinaryConfig;
use crate::services::image_processing::PreparedImage;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.config.cloud_name)
    }

    /// POST a signed form and return the JSON body
    async fn post_signed(
        &self,
        action: &str,
        mut params: Vec<(&'static str, String)>,
        file: Option<String>,
    ) -> Result<serde_json::Value, ImageHostError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        params.push(("timestamp", timestamp));
        let signature = sign(&params, &self.config.api_secret);

        let mut form = params;
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));
        if let Some(file) = file {
            form.push(("file", file));
        }

        let resp = self.client.post(self.endpoint(action)).form(&form).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ImageHostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

/// Request signature: sorted `key=value` pairs joined by `&`, then the secret, SHA-256 hex
fn sign(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: &PreparedImage) -> Result<AssetRef, ImageHostError> {
        let params = vec![("folder", self.config.folder.clone())];
        let body = self.post_signed("upload", params, Some(image.data_uri())).await?;

        let public_id = body["public_id"].as_str();
        let url = body["secure_url"].as_str().or_else(|| body["url"].as_str());
        match (public_id, url) {
            (Some(public_id), Some(url)) => Ok(AssetRef {
                public_id: public_id.to_string(),
                url: url.to_string(),
            }),
            _ => Err(ImageHostError::Response(format!(
                "upload response without public_id/url: {body}"
            ))),
        }
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageHostError> {
        let params = vec![("public_id", public_id.to_string())];
        let body = self.post_signed("destroy", params, None).await?;

        match body["result"].as_str() {
            Some("ok") | Some("not found") => Ok(()),
            _ => Err(ImageHostError::Response(format!("destroy failed: {body}"))),
        }
    }
}
