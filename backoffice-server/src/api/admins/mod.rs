//! Admin API 模块
//!
//! 管理员记录的增删改查；登录、登出与会话检查见 [`crate::api::auth`]。
//! 响应中的 `role` 展开为完整角色，密码哈希从不输出。

use async_trait::async_trait;
use axum::Router;
use shared::models::{Admin, AdminResponse};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{self, Resource};
use crate::core::ServerState;
use crate::db::repository::admin;
use crate::utils::AppResult;

#[async_trait]
impl Resource for Admin {
    type Response = AdminResponse;

    async fn present(db: &Surreal<Db>, records: Vec<Admin>) -> AppResult<Vec<AdminResponse>> {
        Ok(admin::with_roles(db, records).await?)
    }

    /// 被删除的管理员不能继续持有会话
    async fn after_delete(state: &ServerState, record: &Admin) -> AppResult<()> {
        state.auth.destroy_for_admin(&record.id).await?;
        Ok(())
    }
}

pub fn router() -> Router<ServerState> {
    entity::routes::<Admin>()
}
