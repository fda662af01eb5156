//! 会话门控中间件
//!
//! `REQUIRE_SESSION=true` 时挂在实体 CRUD 路由上。
//! 登录、登出、check-session 与 health 不经过此中间件。

use axum::{extract::Request, middleware::Next, response::Response};

use super::CurrentAdmin;

/// 要求有效会话
///
/// 会话解析由 [`CurrentAdmin`] 提取器完成，失败时直接返回 401；
/// 成功后 [`CurrentAdmin`] 留在请求扩展中供处理器复用。
pub async fn require_session(admin: CurrentAdmin, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(admin);
    next.run(req).await
}
