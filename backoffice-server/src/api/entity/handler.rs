//! Entity family handlers

use axum::{
    Json,
    extract::{Path, State},
};

use super::Resource;
use crate::api::payload::Payload;
use crate::api::response::EntityEnvelope;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult};

/// Response form of a single record
async fn present_one<R: Resource>(state: &ServerState, record: R) -> AppResult<R::Response> {
    R::present(&state.db, vec![record])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal(format!("{} vanished while rendering", R::TABLE)))
}

/// GET /api/{table} - 获取全部记录
pub async fn list<R: Resource>(State(state): State<ServerState>) -> AppResult<Json<Vec<R::Response>>> {
    let records = state.service::<R>().list().await?;
    Ok(Json(R::present(&state.db, records).await?))
}

/// GET /api/{table}/{id} - 获取单条记录
pub async fn get_by_id<R: Resource>(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<R::Response>> {
    let record = state.service::<R>().get(&id).await?;
    Ok(Json(present_one(&state, record).await?))
}

/// POST /api/{table}/create - 创建记录
pub async fn create<R: Resource>(
    State(state): State<ServerState>,
    payload: Payload,
) -> AppResult<EntityEnvelope<R::Response>> {
    let record = state
        .service::<R>()
        .create(payload.fields, payload.image)
        .await?;

    tracing::info!(entity = R::TABLE, id = %record.id(), "Record created");

    let response = present_one(&state, record).await?;
    Ok(EntityEnvelope::created(R::TABLE, R::LABEL, response))
}

/// PUT /api/{table}/update/{id} - 部分更新
///
/// 表单中留空的字段视为未提交。
pub async fn update<R: Resource>(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Payload,
) -> AppResult<EntityEnvelope<R::Response>> {
    let payload = payload.without_blank_fields();
    let record = state
        .service::<R>()
        .update(&id, payload.fields, payload.image)
        .await?;

    tracing::info!(entity = R::TABLE, id = %id, "Record updated");

    let response = present_one(&state, record).await?;
    Ok(EntityEnvelope::updated(R::TABLE, R::LABEL, response))
}

/// DELETE /api/{table}/delete/{id} - 删除记录
pub async fn delete<R: Resource>(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let record = state.service::<R>().delete(&id).await?;
    R::after_delete(&state, &record).await?;

    tracing::info!(entity = R::TABLE, id = %id, "Record deleted");

    Ok(ApiResponse::message(format!("{} deleted successfully", R::LABEL)))
}
