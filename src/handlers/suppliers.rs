use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};

use super::crud::{self, ApiResult};
use crate::error::ApiError;
use crate::models::{Supplier, SupplierFilter, SupplierStatus, SupplierSummary};
use crate::types::ApiResponse;
use crate::AppState;

/// Create supplier routes
pub fn create_supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(crud::create::<Supplier>))
        .route("/status/{status}", get(by_status))
        .route(
            "/{id}",
            get(crud::get::<Supplier>)
                .put(crud::update::<Supplier>)
                .delete(crud::delete::<Supplier>),
        )
}

/// Suppliers with their product/order counts and total order value
/// GET /api/supplier
async fn list_suppliers(
    State(state): State<AppState>,
    Query(filter): Query<SupplierFilter>,
) -> ApiResult<Vec<SupplierSummary>> {
    let summaries = state.reports.supplier_summaries(&filter).await?;
    Ok(Json(ApiResponse::ok(summaries)))
}

/// GET /api/supplier/status/{status}
async fn by_status(State(state): State<AppState>, Path(status): Path<String>) -> ApiResult<Vec<SupplierSummary>> {
    let status = SupplierStatus::parse(&status)
        .ok_or_else(|| ApiError::Validation(format!("Unknown supplier status '{status}'")))?;
    let filter = SupplierFilter { status: Some(status) };
    let summaries = state.reports.supplier_summaries(&filter).await?;
    Ok(Json(ApiResponse::ok(summaries)))
}
