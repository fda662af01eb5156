//! Admin session routes
//!
//! 始终公开，不经过会话门控：
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/login | POST | 邮箱 + 密码登录，写入会话 Cookie |
//! | /api/admin/logout | POST | 销毁会话并清除 Cookie (幂等) |
//! | /api/admin/check-session | GET | 当前会话状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/login", post(handler::login))
        .route("/api/admin/logout", post(handler::logout))
        .route("/api/admin/check-session", get(handler::check_session))
}
