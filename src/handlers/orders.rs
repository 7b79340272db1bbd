use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::crud::{self, ApiResult, Created};
use crate::error::ApiError;
use crate::models::{Order, OrderCreate, OrderFilter, OrderItemFilter, OrderStatus, OrderUpdate};
use crate::types::AuthUser;
use crate::AppState;

/// Body of `PUT /api/order/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// Create order routes
pub fn create_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Order>).post(create_order))
        .route("/user/{id}", get(by_user))
        .route("/supplier/{id}", get(by_supplier))
        .route("/warehouse/{id}", get(by_warehouse))
        .route("/status/{status}", get(by_status))
        .route(
            "/{id}",
            get(crud::get::<Order>).put(crud::update::<Order>).delete(delete_order),
        )
        .route("/{id}/status", put(update_status))
}

/// Orders are attributed to the caller unless a creator is given
/// POST /api/order
async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut input): Json<OrderCreate>,
) -> Created<Order> {
    input.user_id.get_or_insert(user.user_id);
    crud::insert::<Order>(&state, input).await
}

/// Move an order along its lifecycle; illegal transitions are a 409
/// PUT /api/order/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> ApiResult<Order> {
    info!("🔄 Order {} -> {}", id, change.status);
    crud::apply_update::<Order>(&state, id, OrderUpdate::status(change.status)).await
}

/// Delete an order together with its line items
/// DELETE /api/order/{id}
async fn delete_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    let items = state
        .repos
        .order_items
        .list(&OrderItemFilter {
            order_id: Some(id),
            ..Default::default()
        })
        .await?;

    let response = crud::delete::<Order>(State(state.clone()), Path(id)).await?;

    for item in &items {
        state.repos.order_items.delete(item.id).await?;
    }
    if !items.is_empty() {
        info!("🗑️  Removed {} line items of order {}", items.len(), id);
    }
    Ok(response)
}

/// GET /api/order/user/{id}
async fn by_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Order>> {
    let filter = OrderFilter {
        user_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<Order>(&state, &filter).await
}

/// GET /api/order/supplier/{id}
async fn by_supplier(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Order>> {
    let filter = OrderFilter {
        supplier_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<Order>(&state, &filter).await
}

/// GET /api/order/warehouse/{id}
async fn by_warehouse(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Order>> {
    let filter = OrderFilter {
        warehouse_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<Order>(&state, &filter).await
}

/// GET /api/order/status/{status}
async fn by_status(State(state): State<AppState>, Path(status): Path<String>) -> ApiResult<Vec<Order>> {
    let status =
        OrderStatus::parse(&status).ok_or_else(|| ApiError::Validation(format!("Unknown order status '{status}'")))?;
    let filter = OrderFilter {
        status: Some(status),
        ..Default::default()
    };
    crud::list_matching::<Order>(&state, &filter).await
}
