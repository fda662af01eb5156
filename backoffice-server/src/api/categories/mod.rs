//! Category API 模块
//!
//! `count` 只由商品写入维护，不接受客户端提交。

use async_trait::async_trait;
use axum::Router;
use shared::models::Category;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{self, Resource};
use crate::core::ServerState;
use crate::utils::AppResult;

#[async_trait]
impl Resource for Category {
    type Response = Category;

    async fn present(_db: &Surreal<Db>, records: Vec<Category>) -> AppResult<Vec<Category>> {
        Ok(records)
    }
}

pub fn router() -> Router<ServerState> {
    entity::routes::<Category>()
}
