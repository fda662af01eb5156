//! Data models
//!
//! Shared between the server and API clients.
//! All IDs are 24-char hex strings assigned by the server.

pub mod admin;
pub mod asset;
pub mod category;
pub mod product;
pub mod role;
pub mod user;

// Re-exports
pub use admin::*;
pub use asset::*;
pub use category::*;
pub use product::*;
pub use role::*;
pub use user::*;
