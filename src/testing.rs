//! Shared fixtures for router and client tests.

use chrono_tz::Tz;
use uuid::Uuid;

use crate::repository::Repositories;
use crate::types::Role;
use crate::utils::AuthService;
use crate::{build_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-with-enough-length";

pub fn test_state(export_limit_per_minute: u32) -> AppState {
    AppState::new(
        Repositories::in_memory(),
        None,
        AuthService::new(TEST_SECRET, 1),
        Tz::UTC,
        export_limit_per_minute,
    )
}

/// Signed token for a fresh user with `role`
pub fn token_for(state: &AppState, role: Role) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = state
        .auth_service
        .generate_token(user_id, "tester", role)
        .expect("token");
    (user_id, token)
}

/// Serve the router on an ephemeral port and return its base URL
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.expect("serve");
    });
    format!("http://{addr}")
}
