//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理员登录、登出、会话检查
//! - [`entity`] - 实体族通用 CRUD 路由
//! - [`role`] - 角色管理接口
//! - [`users`] - 用户管理接口
//! - [`admins`] - 管理员管理接口
//! - [`categories`] - 分类管理接口
//! - [`products`] - 商品管理接口

pub mod payload;
pub mod response;

pub mod auth;
pub mod entity;
pub mod health;

// Entity families
pub mod admins;
pub mod categories;
pub mod products;
pub mod role;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
pub use entity::Resource;
pub use payload::Payload;
pub use response::EntityEnvelope;
