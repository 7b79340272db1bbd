use crate::constants;
use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use std::env;
use tracing::warn;

/// Which entity store backs the repositories
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    SqlServer,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::SqlServer => "sqlserver",
        }
    }
}

/// Database configuration with connection pooling
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_secs: u64,
    pub encryption: bool,
    pub trust_cert: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    pub production: bool,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub jwt_duration_hours: i64,
    pub report_timezone: Tz,
    pub export_rate_limit_per_minute: u32,
}

impl AppConfig {
    /// Load configuration from the process environment (call `dotenv` first)
    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| constants::DEFAULT_SERVER_HOST.to_string());
        let port = env_parse("SERVER_PORT", constants::DEFAULT_SERVER_PORT);
        let cors_origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let production = env::var("RUST_ENV").unwrap_or_default() == "production";

        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "sqlserver" | "mssql" => StorageBackend::SqlServer,
            "memory" => StorageBackend::Memory,
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected 'memory' or 'sqlserver')"),
        };

        let database = match storage {
            StorageBackend::SqlServer => Some(load_database_config()?),
            StorageBackend::Memory => None,
        };

        let jwt_secret = env::var("JWT_SECRET").with_context(|| "Missing environment variable: JWT_SECRET")?;
        if jwt_secret.len() < constants::MIN_JWT_SECRET_LENGTH {
            bail!(
                "JWT_SECRET must be at least {} characters long",
                constants::MIN_JWT_SECRET_LENGTH
            );
        }

        let tz_name = env::var("REPORT_TIMEZONE").unwrap_or_else(|_| constants::DEFAULT_REPORT_TIMEZONE.to_string());
        let report_timezone = crate::utils::parse_timezone(&tz_name);

        Ok(Self {
            host,
            port,
            cors_origins,
            production,
            storage,
            database,
            jwt_secret,
            jwt_duration_hours: env_parse("JWT_DURATION_HOURS", constants::DEFAULT_JWT_DURATION_HOURS),
            report_timezone,
            export_rate_limit_per_minute: env_parse(
                "EXPORT_RATE_LIMIT_PER_MINUTE",
                constants::DEFAULT_EXPORT_RATE_LIMIT_PER_MINUTE,
            ),
        })
    }
}

/// Load database configuration from environment variables
fn load_database_config() -> Result<DatabaseConfig> {
    let server = env::var("DATABASE_SERVER").with_context(|| "Missing environment variable: DATABASE_SERVER")?;
    let database = env::var("DATABASE_NAME").with_context(|| "Missing environment variable: DATABASE_NAME")?;
    let username = env::var("DATABASE_USERNAME").with_context(|| "Missing environment variable: DATABASE_USERNAME")?;
    let password = env::var("DATABASE_PASSWORD").with_context(|| "Missing environment variable: DATABASE_PASSWORD")?;

    Ok(DatabaseConfig {
        server,
        database,
        username,
        password,
        port: env_parse("DATABASE_PORT", constants::DEFAULT_DATABASE_PORT),
        max_connections: env_parse("DATABASE_MAX_CONNECTIONS", constants::DEFAULT_MAX_CONNECTIONS),
        min_connections: env_parse("DATABASE_MIN_CONNECTIONS", constants::DEFAULT_MIN_CONNECTIONS),
        connection_timeout_secs: env_parse(
            "DATABASE_CONNECTION_TIMEOUT_SECS",
            constants::DEFAULT_CONNECTION_TIMEOUT_SECS,
        ),
        encryption: env_parse("DATABASE_ENCRYPTION", false),
        trust_cert: env_parse("DATABASE_TRUST_CERT", false),
    })
}

/// Read and parse an environment variable, falling back to `default` when unset or malformed
fn env_parse<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("⚠️  Ignoring malformed {}='{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
