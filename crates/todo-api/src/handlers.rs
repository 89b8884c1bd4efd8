use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::{service, TodoCreate, TodoId, TodoUpdate};

use crate::error::ApiError;
use crate::extract::CurrentCaller;
use crate::models::{HealthBody, ListParams, Message, TodoPublic, TodosPublic};
use crate::AppState;

/// ヘルスチェック用ハンドラ
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

/// GET /todos
pub async fn list_todos(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TodosPublic>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    let skip = params.skip.unwrap_or(0);
    let limit = state.config.clamp_limit(params.limit);

    let page = service::list_todos(state.store.as_ref(), &caller, skip, limit).await?;
    Ok(Json(page.into()))
}

/// POST /todos
pub async fn create_todo(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<TodoCreate>, JsonRejection>,
) -> Result<Json<TodoPublic>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let todo = service::create_todo(state.store.as_ref(), &caller, input).await?;
    Ok(Json(todo.into()))
}

/// GET /todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
) -> Result<Json<TodoPublic>, ApiError> {
    let id = TodoId::parse(&id)?;

    let todo = service::get_todo(state.store.as_ref(), &caller, &id).await?;
    Ok(Json(todo.into()))
}

/// PUT /todos/{id}（指定フィールドのみ更新）
pub async fn update_todo(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
    payload: Result<Json<TodoUpdate>, JsonRejection>,
) -> Result<Json<TodoPublic>, ApiError> {
    let id = TodoId::parse(&id)?;
    let Json(input) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let todo = service::update_todo(state.store.as_ref(), &caller, &id, input).await?;
    Ok(Json(todo.into()))
}

/// DELETE /todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = TodoId::parse(&id)?;

    service::delete_todo(state.store.as_ref(), &caller, &id).await?;
    Ok(Json(Message::new("ToDo deleted successfully")))
}
