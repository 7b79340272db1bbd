use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::crud::{self, ApiResult, Created};
use crate::error::ApiError;
use crate::models::{Order, OrderItem, OrderItemCreate, OrderItemFilter, OrderTotal};
use crate::types::ApiResponse;
use crate::AppState;

/// Create order item routes
pub fn create_order_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<OrderItem>).post(create_item))
        .route("/order/{id}", get(by_order))
        .route("/order/{id}/total", get(order_total))
        .route("/product/{id}", get(by_product))
        .route(
            "/{id}",
            get(crud::get::<OrderItem>)
                .put(crud::update::<OrderItem>)
                .delete(crud::delete::<OrderItem>),
        )
}

/// Line items must reference an existing order and product
/// POST /api/order-item
async fn create_item(State(state): State<AppState>, Json(input): Json<OrderItemCreate>) -> Created<OrderItem> {
    if state.repos.orders.get(input.order_id).await?.is_none() {
        return Err(ApiError::Validation(format!("Order '{}' does not exist", input.order_id)));
    }
    if state.repos.products.get(input.product_id).await?.is_none() {
        return Err(ApiError::Validation(format!("Product '{}' does not exist", input.product_id)));
    }
    crud::insert::<OrderItem>(&state, input).await
}

async fn items_of(state: &AppState, order_id: Uuid) -> Result<Vec<OrderItem>, ApiError> {
    let filter = OrderItemFilter {
        order_id: Some(order_id),
        ..Default::default()
    };
    Ok(state.repos.order_items.list(&filter).await?)
}

/// GET /api/order-item/order/{id}
async fn by_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<OrderItem>> {
    Ok(Json(ApiResponse::ok(items_of(&state, id).await?)))
}

/// Sum of `quantity * unit_price` over the order's line items
/// GET /api/order-item/order/{id}/total
async fn order_total(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<OrderTotal> {
    crud::fetch::<Order>(&state, id).await?;
    let items = items_of(&state, id).await?;
    Ok(Json(ApiResponse::ok(OrderTotal::from_items(id, &items))))
}

/// GET /api/order-item/product/{id}
async fn by_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<OrderItem>> {
    let filter = OrderItemFilter {
        product_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<OrderItem>(&state, &filter).await
}
