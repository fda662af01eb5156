//! 认证模块
//!
//! 管理员会话认证 (服务端会话 + HTTP-only Cookie)：
//! - [`SessionAuthenticator`] - 登录、登出、会话解析、过期清理
//! - [`CurrentAdmin`] / [`SessionToken`] - 请求提取器
//! - [`require_session`] - 可选的会话门控中间件
//! - [`password`] - Argon2 密码哈希

pub mod cookie;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod session;

pub use extractor::{CurrentAdmin, SessionToken};
pub use middleware::require_session;
pub use session::SessionAuthenticator;
