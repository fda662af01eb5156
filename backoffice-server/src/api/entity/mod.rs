//! 实体族通用路由
//!
//! 五个实体族 (role / user / admin / category / product) 共用同一组路由，
//! 路径前缀取自 [`Entity::TABLE`]：
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/{table}/create | POST | 创建 (JSON 或 multipart) |
//! | /api/{table} | GET | 列表 |
//! | /api/{table}/ | GET | 列表 |
//! | /api/{table}/{id} | GET | 单条 |
//! | /api/{table}/update/{id} | PUT | 部分更新 |
//! | /api/{table}/delete/{id} | DELETE | 删除 |

mod handler;

use async_trait::async_trait;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::ServerState;
use crate::db::repository::Entity;
use crate::utils::AppResult;

/// HTTP view of an entity family
///
/// `present` turns stored records into their response form, populating
/// referenced records where the family has any.
#[async_trait]
pub trait Resource: Entity {
    type Response: Serialize + Send + 'static;

    async fn present(db: &Surreal<Db>, records: Vec<Self>) -> AppResult<Vec<Self::Response>>;

    /// Cleanup beyond the record and its image
    async fn after_delete(_state: &ServerState, _record: &Self) -> AppResult<()> {
        Ok(())
    }
}

/// CRUD routes for one entity family
pub fn routes<R: Resource>() -> Router<ServerState> {
    let base = format!("/api/{}", R::TABLE);
    Router::new()
        .route(&format!("{base}/create"), post(handler::create::<R>))
        .route(&base, get(handler::list::<R>))
        .route(&format!("{base}/"), get(handler::list::<R>))
        .route(&format!("{base}/{{id}}"), get(handler::get_by_id::<R>))
        .route(&format!("{base}/update/{{id}}"), put(handler::update::<R>))
        .route(&format!("{base}/delete/{{id}}"), delete(handler::delete::<R>))
}
