//! Product API 模块
//!
//! 响应中的 `category` 展开为 `{id, name, count}`，分类已不存在时为 `null`。

use async_trait::async_trait;
use axum::Router;
use shared::models::{Product, ProductResponse};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{self, Resource};
use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::AppResult;

#[async_trait]
impl Resource for Product {
    type Response = ProductResponse;

    async fn present(db: &Surreal<Db>, records: Vec<Product>) -> AppResult<Vec<ProductResponse>> {
        Ok(product::with_categories(db, records).await?)
    }
}

pub fn router() -> Router<ServerState> {
    entity::routes::<Product>()
}
