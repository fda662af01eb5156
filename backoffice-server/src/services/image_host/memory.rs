//! In-memory image host
//!
//! Keeps uploaded bytes in a map. Also the fallback when no image host
//! credentials are configured; only hosts built with
//! [`MemoryImageHost::recording`] keep a log of calls, so the fallback does
//! not grow one.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use shared::models::AssetRef;
use tokio::sync::RwLock;

use super::{ImageHost, ImageHostError};
use crate::services::image_processing::PreparedImage;

/// One recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Upload(String),
    Destroy(String),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryImageHost {
    assets: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    calls: Option<Arc<RwLock<Vec<HostCall>>>>,
    next_id: Arc<AtomicU64>,
    fail_uploads: Arc<AtomicBool>,
    fail_destroys: Arc<AtomicBool>,
}

impl MemoryImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that also records every call in order
    pub fn recording() -> Self {
        Self {
            calls: Some(Arc::default()),
            ..Self::default()
        }
    }

    /// Calls made so far, oldest first; always empty unless recording
    pub async fn calls(&self) -> Vec<HostCall> {
        match &self.calls {
            Some(calls) => calls.read().await.clone(),
            None => Vec::new(),
        }
    }

    async fn record(&self, call: HostCall) {
        if let Some(calls) = &self.calls {
            calls.write().await.push(call);
        }
    }

    /// Whether an asset is currently stored
    pub async fn contains(&self, public_id: &str) -> bool {
        self.assets.read().await.contains_key(public_id)
    }

    /// Make subsequent uploads fail with a rejection
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent destroys fail with a rejection
    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroys.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageHost for MemoryImageHost {
    async fn upload(&self, image: &PreparedImage) -> Result<AssetRef, ImageHostError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ImageHostError::Rejected {
                status: 503,
                message: "upload disabled".into(),
            });
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("memory/{n}");
        self.record(HostCall::Upload(public_id.clone())).await;
        self.assets
            .write()
            .await
            .insert(public_id.clone(), image.bytes.clone());

        Ok(AssetRef {
            url: format!("memory://{public_id}"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageHostError> {
        self.record(HostCall::Destroy(public_id.to_string())).await;
        if self.fail_destroys.load(Ordering::SeqCst) {
            return Err(ImageHostError::Rejected {
                status: 503,
                message: "destroy disabled".into(),
            });
        }
        self.assets.write().await.remove(public_id);
        Ok(())
    }
}
