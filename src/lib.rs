//! Inventory dashboard backend: REST entity store, report aggregation and typed client providers.

use axum::{middleware::from_fn_with_state, routing::get, Router};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

pub mod client;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod reports;
pub mod repository;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use config::StorageBackend;
use database::Database;
use middleware::auth::jwt_auth_middleware;
use repository::Repositories;
use services::ReportService;
use utils::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub database: Option<Database>,
    pub auth_service: AuthService,
    pub reports: ReportService,
    /// Report exports per user per minute
    pub export_limiter: Arc<DefaultKeyedRateLimiter<Uuid>>,
    pub storage: StorageBackend,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage)
            .field("database", &self.database)
            .field("auth_service", &self.auth_service)
            .finish()
    }
}

impl AppState {
    pub fn new(
        repos: Repositories,
        database: Option<Database>,
        auth_service: AuthService,
        report_tz: chrono_tz::Tz,
        export_limit_per_minute: u32,
    ) -> Self {
        let storage = if database.is_some() {
            StorageBackend::SqlServer
        } else {
            StorageBackend::Memory
        };
        let quota = Quota::per_minute(NonZeroU32::new(export_limit_per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            reports: ReportService::new(repos.clone(), report_tz),
            repos,
            database,
            auth_service,
            export_limiter: Arc::new(RateLimiter::keyed(quota)),
            storage,
        }
    }
}

/// All API routes; everything except health, storage status and the auth debug route requires a JWT
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/order", handlers::orders::create_order_routes())
        .nest("/api/product", handlers::products::create_product_routes())
        .nest("/api/supplier", handlers::suppliers::create_supplier_routes())
        .nest("/api/warehouse", handlers::warehouses::create_warehouse_routes())
        .nest("/api/order-item", handlers::order_items::create_order_item_routes())
        .nest("/api/reports", handlers::reports::create_report_routes())
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/health", get(handlers::system::health))
        .route("/api/database/status", get(handlers::system::database_status))
        .route("/api/debug/auth", get(handlers::system::debug_auth))
        .merge(protected)
        .with_state(state)
}
