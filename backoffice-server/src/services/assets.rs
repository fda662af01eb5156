//! 图片资源生命周期
//!
//! 记录拥有自己的 [`AssetRef`]；图床上的图片随记录创建、替换、删除。
//!
//! | 操作 | 图床动作 |
//! |------|----------|
//! | attach (创建) | 有文件则上传 |
//! | replace (更新) | 有文件则先删除旧图，再上传新图；无文件保持原图 |
//! | release (删除) | 有引用则删除 |
//! | discard (补偿) | 写库失败后删除刚上传的图，失败只记日志 |

use std::sync::Arc;

use shared::models::AssetRef;

use super::image_host::ImageHost;
use super::image_processing::{self, PreparedImage, UploadedImage};
use crate::core::UploadConfig;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AssetCoordinator {
    host: Arc<dyn ImageHost>,
    upload: UploadConfig,
}

impl AssetCoordinator {
    pub fn new(host: Arc<dyn ImageHost>, upload: UploadConfig) -> Self {
        Self { host, upload }
    }

    /// Validate and re-encode off the async runtime
    pub async fn prepare(&self, incoming: UploadedImage) -> AppResult<PreparedImage> {
        let config = self.upload.clone();
        tokio::task::spawn_blocking(move || image_processing::prepare(&incoming, &config))
            .await
            .map_err(|e| AppError::internal(format!("Image processing task failed: {e}")))?
    }

    /// Upload a new image, if one was sent
    pub async fn attach(&self, incoming: Option<UploadedImage>) -> AppResult<Option<AssetRef>> {
        let Some(incoming) = incoming else {
            return Ok(None);
        };
        let prepared = self.prepare(incoming).await?;
        let asset = self.host.upload(&prepared).await?;
        tracing::info!(public_id = %asset.public_id, "Image uploaded");
        Ok(Some(asset))
    }

    /// Swap the image of an existing record
    ///
    /// The new file is validated first so a bad upload never costs the old
    /// image. The old image is deleted before the new one is uploaded.
    pub async fn replace(
        &self,
        old: Option<&AssetRef>,
        incoming: Option<UploadedImage>,
    ) -> AppResult<Option<AssetRef>> {
        let Some(incoming) = incoming else {
            return Ok(old.cloned());
        };
        let prepared = self.prepare(incoming).await?;

        if let Some(old) = old {
            self.host.destroy(&old.public_id).await?;
            tracing::info!(public_id = %old.public_id, "Previous image deleted");
        }

        let asset = self.host.upload(&prepared).await?;
        tracing::info!(public_id = %asset.public_id, "Image uploaded");
        Ok(Some(asset))
    }

    /// Delete the image of a removed record
    pub async fn release(&self, reference: Option<&AssetRef>) -> AppResult<()> {
        if let Some(asset) = reference {
            self.host.destroy(&asset.public_id).await?;
            tracing::info!(public_id = %asset.public_id, "Image deleted");
        }
        Ok(())
    }

    /// Best-effort removal of an image whose record was never written
    pub async fn discard(&self, asset: &AssetRef) {
        match self.host.destroy(&asset.public_id).await {
            Ok(()) => tracing::warn!(public_id = %asset.public_id, "Orphaned image discarded"),
            Err(e) => tracing::error!(
                public_id = %asset.public_id,
                error = %e,
                "Failed to discard orphaned image"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;
    use crate::services::image_host::{HostCall, MemoryImageHost};

    fn png() -> UploadedImage {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        UploadedImage {
            file_name: Some("a.png".into()),
            content_type: Some("image/png".into()),
            bytes,
        }
    }

    fn coordinator(host: &MemoryImageHost) -> AssetCoordinator {
        AssetCoordinator::new(
            Arc::new(host.clone()),
            UploadConfig {
                max_bytes: 1024 * 1024,
                max_dimension: 500,
            },
        )
    }

    #[tokio::test]
    async fn test_attach_without_file_is_noop() {
        let host = MemoryImageHost::recording();
        assert!(coordinator(&host).attach(None).await.unwrap().is_none());
        assert!(host.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_without_file_keeps_old() {
        let host = MemoryImageHost::recording();
        let old = AssetRef {
            public_id: "memory/old".into(),
            url: "memory://memory/old".into(),
        };
        let kept = coordinator(&host).replace(Some(&old), None).await.unwrap();
        assert_eq!(kept, Some(old));
        assert!(host.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_deletes_old_before_upload() {
        let host = MemoryImageHost::recording();
        let assets = coordinator(&host);
        let first = assets.attach(Some(png())).await.unwrap().unwrap();

        let second = assets.replace(Some(&first), Some(png())).await.unwrap().unwrap();

        assert_eq!(
            host.calls().await,
            vec![
                HostCall::Upload(first.public_id.clone()),
                HostCall::Destroy(first.public_id.clone()),
                HostCall::Upload(second.public_id.clone()),
            ]
        );
        assert!(!host.contains(&first.public_id).await);
        assert!(host.contains(&second.public_id).await);
    }

    #[tokio::test]
    async fn test_invalid_replacement_keeps_old_image() {
        let host = MemoryImageHost::recording();
        let assets = coordinator(&host);
        let first = assets.attach(Some(png())).await.unwrap().unwrap();

        let bad = UploadedImage {
            file_name: Some("b.png".into()),
            content_type: None,
            bytes: b"garbage".to_vec(),
        };
        assert!(assets.replace(Some(&first), Some(bad)).await.is_err());
        assert!(host.contains(&first.public_id).await);
    }

    #[tokio::test]
    async fn test_release_surfaces_host_failure() {
        let host = MemoryImageHost::recording();
        let assets = coordinator(&host);
        let first = assets.attach(Some(png())).await.unwrap().unwrap();

        host.fail_destroys(true);
        assert!(assets.release(Some(&first)).await.is_err());
        assert!(assets.release(None).await.is_ok());
    }
}
