use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};

use super::crud::{self, ApiResult, Created};
use crate::models::{Warehouse, WarehouseCreate, WarehouseFilter};
use crate::types::AuthUser;
use crate::AppState;

/// Create warehouse routes
pub fn create_warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Warehouse>).post(create_warehouse))
        .route("/user", get(for_current_user))
        .route(
            "/{id}",
            get(crud::get::<Warehouse>)
                .put(crud::update::<Warehouse>)
                .delete(crud::delete::<Warehouse>),
        )
}

/// New warehouses are managed by their creator unless a manager is given
/// POST /api/warehouse
async fn create_warehouse(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut input): Json<WarehouseCreate>,
) -> Created<Warehouse> {
    input.manager_id.get_or_insert(user.user_id);
    crud::insert::<Warehouse>(&state, input).await
}

/// Warehouses managed by the caller
/// GET /api/warehouse/user
async fn for_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Warehouse>> {
    let filter = WarehouseFilter {
        manager_id: Some(user.user_id),
        ..Default::default()
    };
    crud::list_matching::<Warehouse>(&state, &filter).await
}
