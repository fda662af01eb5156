//! User API 模块

use async_trait::async_trait;
use axum::Router;
use shared::models::User;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{self, Resource};
use crate::core::ServerState;
use crate::utils::AppResult;

#[async_trait]
impl Resource for User {
    type Response = User;

    async fn present(_db: &Surreal<Db>, records: Vec<User>) -> AppResult<Vec<User>> {
        Ok(records)
    }
}

pub fn router() -> Router<ServerState> {
    entity::routes::<User>()
}
