use axum::{extract::State, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::PoolStatus;
use crate::error::ApiError;
use crate::types::{ApiResponse, AuthUser};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatusResponse {
    pub storage: String,
    pub connected: bool,
    pub database: Option<String>,
    pub pool: Option<PoolStatus>,
    pub missing_tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugAuthResponse {
    pub has_cookie: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
}

/// Liveness check
/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: state.storage.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
        "Inventory backend is running",
    ))
}

/// Storage backend details, including missing tables and pool usage for SQL Server
/// GET /api/database/status
pub async fn database_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DatabaseStatusResponse>>, ApiError> {
    let Some(database) = &state.database else {
        return Ok(Json(ApiResponse::success(
            DatabaseStatusResponse {
                storage: state.storage.as_str().to_string(),
                connected: true,
                database: None,
                pool: None,
                missing_tables: Vec::new(),
            },
            "In-memory storage",
        )));
    };

    let mut missing_tables = Vec::new();
    for (table, _) in crate::database::schema::TABLES {
        if !database.table_exists(table).await? {
            missing_tables.push(table.to_string());
        }
    }
    let message = if missing_tables.is_empty() {
        "Database connection is healthy"
    } else {
        "Database connected but some tables are missing"
    };

    Ok(Json(ApiResponse::success(
        DatabaseStatusResponse {
            storage: state.storage.as_str().to_string(),
            connected: true,
            database: Some(database.get_database_name().to_string()),
            pool: Some(database.get_pool_status()),
            missing_tables,
        },
        message,
    )))
}

/// Value of the `token` cookie, if any
fn token_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_string())
}

/// Reports whether the `token` cookie carries a valid JWT
/// GET /api/debug/auth
pub async fn debug_auth(State(state): State<AppState>, headers: HeaderMap) -> Json<ApiResponse<DebugAuthResponse>> {
    let Some(token) = token_cookie(&headers) else {
        return Json(ApiResponse::success(
            DebugAuthResponse {
                has_cookie: false,
                valid: false,
                user: None,
            },
            "No token cookie found",
        ));
    };

    match state.auth_service.verify_token(&token) {
        Ok(claims) => Json(ApiResponse::success(
            DebugAuthResponse {
                has_cookie: true,
                valid: true,
                user: Some(AuthUser::from(claims)),
            },
            "Token cookie is valid",
        )),
        Err(e) => {
            debug!("🔍 Token cookie rejected: {}", e);
            Json(ApiResponse::success(
                DebugAuthResponse {
                    has_cookie: true,
                    valid: false,
                    user: None,
                },
                "Token cookie is invalid or expired",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(token_cookie(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_token_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::COOKIE, HeaderValue::from_static("tokenx=1"));
        assert_eq!(token_cookie(&headers), None);
    }
}
