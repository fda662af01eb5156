//! 服务层
//!
//! # 服务列表
//!
//! - [`EntityService`] - 实体族通用写入流程 (校验、引用、唯一性、计数器、图片)
//! - [`AssetCoordinator`] - 图片生命周期
//! - [`image_host`] - 图床客户端 (Cloudinary / 内存)
//! - [`image_processing`] - 上传前的图片校验与缩放
//! - [`https`] - HTTP 应用组装

pub mod assets;
pub mod entity_service;
pub mod https;
pub mod image_host;
pub mod image_processing;

pub use assets::AssetCoordinator;
pub use entity_service::EntityService;
pub use image_processing::UploadedImage;
