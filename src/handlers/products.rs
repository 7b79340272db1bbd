use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::crud::{self, ApiResult};
use crate::models::{collect_alerts, InventoryAlert, Product, ProductFilter};
use crate::reports::ReportStockBucket;
use crate::types::ApiResponse;
use crate::AppState;

/// Create product routes
pub fn create_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Product>).post(crud::create::<Product>))
        .route("/low-stock", get(low_stock))
        .route("/alerts", get(alerts))
        .route("/sku/{sku}", get(by_sku))
        .route("/supplier/{id}", get(by_supplier))
        .route("/warehouse/{id}", get(by_warehouse))
        .route("/category/{category}", get(by_category))
        .route(
            "/{id}",
            get(crud::get::<Product>)
                .put(crud::update::<Product>)
                .delete(crud::delete::<Product>),
        )
}

/// Look up a single product by SKU
/// GET /api/product/sku/{sku}
async fn by_sku(State(state): State<AppState>, Path(sku): Path<String>) -> ApiResult<Product> {
    let filter = ProductFilter {
        sku: Some(sku.clone()),
        ..Default::default()
    };
    let product = state
        .repos
        .products
        .list(&filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| crate::error::ApiError::NotFound(format!("Product with SKU '{sku}' not found")))?;
    Ok(Json(ApiResponse::ok(product)))
}

/// GET /api/product/supplier/{id}
async fn by_supplier(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Product>> {
    let filter = ProductFilter {
        supplier_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<Product>(&state, &filter).await
}

/// GET /api/product/warehouse/{id}
async fn by_warehouse(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Product>> {
    let filter = ProductFilter {
        warehouse_id: Some(id),
        ..Default::default()
    };
    crud::list_matching::<Product>(&state, &filter).await
}

/// GET /api/product/category/{category}
async fn by_category(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult<Vec<Product>> {
    let filter = ProductFilter {
        category: Some(category),
        ..Default::default()
    };
    crud::list_matching::<Product>(&state, &filter).await
}

/// Products that are out of stock or at/below their minimum level
/// GET /api/product/low-stock
async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.repos.products.list(&ProductFilter::default()).await?;
    let flagged = products
        .into_iter()
        .filter(|p| ReportStockBucket::of(p) != ReportStockBucket::InStock)
        .collect();
    Ok(Json(ApiResponse::ok(flagged)))
}

/// GET /api/product/alerts
async fn alerts(State(state): State<AppState>) -> ApiResult<Vec<InventoryAlert>> {
    let products = state.repos.products.list(&ProductFilter::default()).await?;
    Ok(Json(ApiResponse::ok(collect_alerts(&products))))
}
