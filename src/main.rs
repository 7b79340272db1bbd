use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tokio::time;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use inventory_backend::config::AppConfig;
use inventory_backend::constants::{
    POOL_ELEVATED_USAGE_THRESHOLD, POOL_HIGH_USAGE_THRESHOLD, POOL_MONITOR_INTERVAL_SECS,
};
use inventory_backend::database::Database;
use inventory_backend::repository::Repositories;
use inventory_backend::utils::AuthService;
use inventory_backend::{build_router, AppState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing() {
    let default_level = if cfg!(debug_assertions) {
        "inventory_backend=info,tower_http=warn"
    } else {
        "inventory_backend=warn,tower_http=error"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if config.cors_origins == "*" {
        if config.production {
            anyhow::bail!("CORS wildcard (*) is not allowed in production. Set CORS_ORIGINS to specific origins");
        }
        warn!("⚠️ CORS is configured with wildcard (*) - this is only acceptable for development!");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
            .expose_headers([header::CONTENT_DISPOSITION]));
    }

    info!("🔒 CORS configured for specific origins: {}", config.cors_origins);
    let mut origins: Vec<HeaderValue> = config
        .cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        warn!("⚠️ No valid CORS origins found in CORS_ORIGINS, falling back to localhost only");
        origins.push(HeaderValue::from_static("http://localhost:4400"));
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🚀 Starting Inventory Backend v{}", VERSION);

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!("Server configured to run on {}:{}", config.host, config.port);
    info!("💾 Storage backend: {}", config.storage.as_str());
    info!("🕒 Report timezone: {}", config.report_timezone);

    let database = match config.database.clone() {
        Some(db_config) => {
            let database = Database::connect(db_config)
                .await
                .context("Failed to initialize database with connection pool")?;
            database
                .ensure_schema()
                .await
                .context("Failed to create inventory tables")?;
            Some(database)
        }
        None => {
            warn!("⚠️  Using the in-memory store; data is lost on restart");
            None
        }
    };

    let repos = match &database {
        Some(db) => Repositories::sql_server(db.clone()),
        None => Repositories::in_memory(),
    };

    let auth_service = AuthService::new(&config.jwt_secret, config.jwt_duration_hours);
    let state = AppState::new(
        repos,
        database.clone(),
        auth_service,
        config.report_timezone,
        config.export_rate_limit_per_minute,
    );

    let app = build_router(state)
        .layer(cors_layer(&config)?)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port))
        .await
        .context("Failed to bind to address")?;

    info!("🎯 Inventory Server started successfully on http://{}:{}", config.host, config.port);
    info!("🔧 API endpoints available at http://{}:{}/api/", config.host, config.port);

    if let Some(db) = database {
        tokio::spawn(monitor_pool_health(db));
    }

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

/// Monitor connection pool health and log warnings
async fn monitor_pool_health(database: Database) {
    loop {
        time::sleep(Duration::from_secs(POOL_MONITOR_INTERVAL_SECS)).await;
        let pool_status = database.get_pool_status();
        let usage_percent = pool_status.usage_percent();

        if usage_percent >= POOL_HIGH_USAGE_THRESHOLD {
            error!(
                connections = pool_status.total_connections,
                idle = pool_status.idle_connections,
                max = pool_status.max_size,
                utilization = %format!("{:.1}%", usage_percent),
                "⚠️ Connection pool utilization HIGH - consider increasing DATABASE_MAX_CONNECTIONS"
            );
        } else if usage_percent >= POOL_ELEVATED_USAGE_THRESHOLD {
            info!(
                connections = pool_status.total_connections,
                idle = pool_status.idle_connections,
                max = pool_status.max_size,
                utilization = %format!("{:.1}%", usage_percent),
                "⚡ Connection pool utilization elevated"
            );
        }
    }
}
