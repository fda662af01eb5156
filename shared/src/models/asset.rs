//! Asset Reference Model

use serde::{Deserialize, Serialize};

/// Pointer to an image stored on the external image host
///
/// The record that holds it owns the asset exclusively; the host is only
/// reachable through `public_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Host-side identifier, used for deletion
    pub public_id: String,
    /// Public retrieval URL
    pub url: String,
}
