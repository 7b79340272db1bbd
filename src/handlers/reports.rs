use axum::{
    extract::{Extension, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::crud::ApiResult;
use crate::constants::MSG_FORBIDDEN;
use crate::error::ApiError;
use crate::reports::{export_file_name, export_string, ExportScope, Report, ReportFilters};
use crate::types::{ApiResponse, AuthUser};
use crate::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub scope: ExportScope,
}

/// Create report routes
pub fn create_report_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_report))
        .route("/export", get(export_report))
}

/// Dashboard stats and report tables for the given filters
/// GET /api/reports
async fn get_report(State(state): State<AppState>, Query(filters): Query<ReportFilters>) -> ApiResult<Report> {
    let report = state.reports.report(&filters, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// Download a report (or one of its tables) as a JSON attachment; admin and manager only
/// GET /api/reports/export
#[instrument(skip_all, fields(user = %user.username, scope = ?params.scope))]
async fn export_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filters): Query<ReportFilters>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    if !user.role.can_export() {
        warn!("🚫 Export denied for role {:?}", user.role);
        return Err(ApiError::Forbidden(MSG_FORBIDDEN.to_string()));
    }
    let now = Utc::now();
    // Malformed filters are rejected before they cost quota
    state.reports.window(&filters, now)?;
    if state.export_limiter.check_key(&user.user_id).is_err() {
        warn!("🚫 Export rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let report = state.reports.report(&filters, now).await?;
    let body = export_string(&report, params.scope)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize report export: {e}")))?;
    let file_name = export_file_name(params.scope, now);
    info!("📤 Exporting {} ({} bytes)", file_name, body.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        body,
    )
        .into_response())
}
