//! Role API Module

use async_trait::async_trait;
use axum::Router;
use shared::models::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{self, Resource};
use crate::core::ServerState;
use crate::utils::AppResult;

#[async_trait]
impl Resource for Role {
    type Response = Role;

    async fn present(_db: &Surreal<Db>, records: Vec<Role>) -> AppResult<Vec<Role>> {
        Ok(records)
    }
}

/// Role router
pub fn router() -> Router<ServerState> {
    entity::routes::<Role>()
}
