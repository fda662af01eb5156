//! 图床客户端
//!
//! 记录只保存 [`AssetRef`]，图片本体在外部图床上。
//! - [`CloudinaryHost`] - Cloudinary REST API (签名上传/删除)
//! - [`MemoryImageHost`] - 内存实现，用于测试和未配置凭证的开发环境

mod cloudinary;
mod memory;

pub use cloudinary::CloudinaryHost;
pub use memory::{HostCall, MemoryImageHost};

use async_trait::async_trait;
use shared::models::AssetRef;
use thiserror::Error;

use super::image_processing::PreparedImage;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum ImageHostError {
    #[error("Image host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected image host response: {0}")]
    Response(String),
}

impl From<ImageHostError> for AppError {
    fn from(err: ImageHostError) -> Self {
        AppError::image_host(err.to_string())
    }
}

/// External image storage
#[async_trait]
pub trait ImageHost: Send + Sync + std::fmt::Debug {
    /// Store an image and return its reference
    async fn upload(&self, image: &PreparedImage) -> Result<AssetRef, ImageHostError>;

    /// Delete an image; deleting an unknown id succeeds
    async fn destroy(&self, public_id: &str) -> Result<(), ImageHostError>;
}
