use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::constants::MSG_UNAUTHORIZED;
use crate::types::{ApiResponse, AuthUser};
use crate::AppState;

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Reject requests without a valid JWT; on success the caller is available as `Extension<AuthUser>`
pub async fn jwt_auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&request) else {
        debug!("🔒 Missing bearer token for {}", request.uri().path());
        return unauthorized(MSG_UNAUTHORIZED);
    };

    match state.auth_service.verify_token(token) {
        Ok(claims) => {
            let user = AuthUser::from(claims);
            debug!("🔓 Authenticated {} ({:?})", user.username, user.role);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!("🚫 Rejected token for {}: {}", request.uri().path(), e);
            unauthorized("Invalid or expired token")
        }
    }
}
