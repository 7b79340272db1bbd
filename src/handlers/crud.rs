//! Generic list/get/create/update/delete handlers shared by every entity router.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Validate;
use crate::repository::{Entity, Stored};
use crate::types::ApiResponse;
use crate::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn not_found<T: Entity>(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("{} '{}' not found", T::NAME, id))
}

/// Load an entity or fail with 404
pub(crate) async fn fetch<T: Stored>(state: &AppState, id: Uuid) -> Result<T, ApiError> {
    T::repository(&state.repos).get(id).await?.ok_or_else(|| not_found::<T>(id))
}

pub(crate) async fn list_matching<T: Stored>(state: &AppState, filter: &T::Filter) -> ApiResult<Vec<T>> {
    let items = T::repository(&state.repos).list(filter).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// Validate, build and insert a new entity
pub(crate) async fn insert<T: Stored>(state: &AppState, input: T::Create) -> Created<T> {
    input.validate()?;
    let entity = T::create(input, Utc::now())?;
    let created = T::repository(&state.repos).insert(entity).await?;
    info!("✅ {} {} created", T::NAME, created.id());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, format!("{} created successfully", T::NAME))),
    ))
}

/// Validate and apply a partial update to an existing entity
pub(crate) async fn apply_update<T: Stored>(state: &AppState, id: Uuid, update: T::Update) -> ApiResult<T> {
    update.validate()?;
    let mut entity = fetch::<T>(state, id).await?;
    entity.apply(update, Utc::now())?;
    let saved = T::repository(&state.repos).save(entity).await?;
    Ok(Json(ApiResponse::success(saved, format!("{} updated successfully", T::NAME))))
}

/// GET /api/<entity>
pub async fn list<T: Stored>(State(state): State<AppState>, Query(filter): Query<T::Filter>) -> ApiResult<Vec<T>> {
    list_matching::<T>(&state, &filter).await
}

/// GET /api/<entity>/{id}
pub async fn get<T: Stored>(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(fetch::<T>(&state, id).await?)))
}

/// POST /api/<entity>
pub async fn create<T: Stored>(State(state): State<AppState>, Json(input): Json<T::Create>) -> Created<T> {
    insert::<T>(&state, input).await
}

/// PUT /api/<entity>/{id}
pub async fn update<T: Stored>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<T::Update>,
) -> ApiResult<T> {
    apply_update::<T>(&state, id, update).await
}

/// DELETE /api/<entity>/{id}
pub async fn delete<T: Stored>(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if !T::repository(&state.repos).delete(id).await? {
        warn!("⚠️  Delete of missing {} {}", T::NAME, id);
        return Err(not_found::<T>(id));
    }
    info!("🗑️  {} {} deleted", T::NAME, id);
    Ok(Json(ApiResponse::done(format!("{} deleted successfully", T::NAME))))
}
