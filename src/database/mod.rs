use crate::config::DatabaseConfig;
use crate::error::StoreError;
use anyhow::{Context, Result};
use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;
use tiberius::{AuthMethod, Config, EncryptionLevel, Query, Row, ToSql};
use tracing::{info, warn};
use uuid::Uuid;

mod order_db;
mod order_item_db;
mod product_db;
pub mod schema;
mod supplier_db;
mod warehouse_db;

/// Database management with connection pooling
#[derive(Clone)]
pub struct Database {
    /// Connection pool for all database operations
    pool: Pool<ConnectionManager>,
    /// Database configuration
    config: DatabaseConfig,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("database", &self.config.database)
            .field("server", &self.config.server)
            .field("max_connections", &self.config.max_connections)
            .finish()
    }
}

impl Database {
    /// Initialize database with connection pooling
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        info!("🔄 Initializing database with connection pooling");

        let pool = Self::create_pool(&config).await?;

        info!(
            "✅ Connection pool initialized - Database: {}, Max connections: {}, Min idle: {}",
            config.database, config.max_connections, config.min_connections
        );

        Ok(Self { pool, config })
    }

    /// Create connection pool with configurable parameters
    async fn create_pool(config: &DatabaseConfig) -> Result<Pool<ConnectionManager>> {
        let mut tiberius_config = Config::new();
        tiberius_config.host(&config.server);
        tiberius_config.port(config.port);
        tiberius_config.database(&config.database);
        tiberius_config.authentication(AuthMethod::sql_server(&config.username, &config.password));

        if config.encryption {
            info!("🔒 Database encryption enabled");
            tiberius_config.encryption(EncryptionLevel::Required);
        } else {
            warn!("⚠️  Database encryption disabled (not recommended for production)");
            tiberius_config.encryption(EncryptionLevel::NotSupported);
        }

        // Self-signed certificates on internal networks
        if config.trust_cert {
            warn!("⚠️  Database certificate trust enabled (accepting self-signed certificates)");
            tiberius_config.trust_cert();
        }

        let manager = ConnectionManager::new(tiberius_config);

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(1800)))
            .build(manager)
            .await
            .context("Failed to create connection pool")?;

        // Test pool connectivity with one connection
        let test_conn = pool.get().await.context("Failed to get test connection from pool")?;

        info!("✅ Connection pool test successful");
        drop(test_conn);

        Ok(pool)
    }

    /// Get pooled database client connection (reuses existing connections)
    pub async fn get_client(&self) -> Result<bb8::PooledConnection<'_, ConnectionManager>, StoreError> {
        self.pool.get().await.map_err(|e| {
            StoreError::Database(format!(
                "Failed to get connection from pool for database {}: {e}",
                self.config.database
            ))
        })
    }

    /// Get database name
    pub fn get_database_name(&self) -> &str {
        &self.config.database
    }

    /// Check if a table exists in the database
    pub async fn table_exists(&self, table_name: &str) -> Result<bool, StoreError> {
        let mut client = self.get_client().await?;

        let query = r#"
            SELECT COUNT(*) as table_count
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_NAME = @P1 AND TABLE_TYPE = 'BASE TABLE'
        "#;

        let mut query_builder = Query::new(query);
        query_builder.bind(table_name);

        let stream = query_builder.query(&mut *client).await?;
        let rows: Vec<Vec<Row>> = stream.into_results().await?;

        if let Some(row) = rows.first().and_then(|r| r.first()) {
            let count: i32 = row.get("table_count").unwrap_or(0);
            Ok(count > 0)
        } else {
            Ok(false)
        }
    }

    /// Create any missing inventory tables
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for (table, ddl) in schema::TABLES {
            if self.table_exists(table).await? {
                continue;
            }
            info!("🛠️  Creating missing table '{}'", table);
            let mut client = self.get_client().await?;
            client.simple_query(ddl).await?.into_results().await?;
        }
        Ok(())
    }

    /// Get connection pool statistics for monitoring
    pub fn get_pool_status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            total_connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_connections,
        }
    }
}

/// Connection pool status for monitoring
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub total_connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
}

impl PoolStatus {
    pub fn usage_percent(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        f64::from(self.total_connections) / f64::from(self.max_size) * 100.0
    }
}

/// SQL Server implementation of every entity repository
pub struct SqlStore {
    db: Database,
}

impl SqlStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// `WHERE` clause assembled from optional equality filters with positional `@P` params
pub(crate) struct WhereClause<'a> {
    clauses: Vec<String>,
    params: Vec<&'a dyn ToSql>,
}

impl<'a> WhereClause<'a> {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn eq(&mut self, column: &str, value: &'a dyn ToSql) -> &mut Self {
        self.params.push(value);
        self.clauses.push(format!("{column} = @P{}", self.params.len()));
        self
    }

    pub fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[&'a dyn ToSql] {
        &self.params
    }
}

pub(crate) fn read_string(row: &Row, column: &str) -> String {
    row.get::<&str, _>(column).unwrap_or("").to_string()
}

pub(crate) fn read_opt_string(row: &Row, column: &str) -> Option<String> {
    row.get::<&str, _>(column).map(str::to_string)
}

pub(crate) fn read_uuid(row: &Row, column: &str) -> Result<Uuid, StoreError> {
    row.get::<Uuid, _>(column)
        .ok_or_else(|| StoreError::Database(format!("Column '{column}' is NULL")))
}

pub(crate) fn read_opt_uuid(row: &Row, column: &str) -> Option<Uuid> {
    row.get::<Uuid, _>(column)
}

pub(crate) fn read_f64(row: &Row, column: &str) -> f64 {
    row.get::<f64, _>(column).unwrap_or(0.0)
}

pub(crate) fn read_i32(row: &Row, column: &str) -> i32 {
    row.get::<i32, _>(column).unwrap_or(0)
}

pub(crate) fn read_bool(row: &Row, column: &str) -> bool {
    row.get::<bool, _>(column).unwrap_or(false)
}

pub(crate) fn read_opt_datetime(row: &Row, column: &str) -> Option<DateTime<Utc>> {
    row.get::<NaiveDateTime, _>(column)
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

pub(crate) fn read_datetime(row: &Row, column: &str) -> DateTime<Utc> {
    read_opt_datetime(row, column).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_numbers_params_in_order() {
        let status = "pending";
        let id = Uuid::nil();
        let mut clause = WhereClause::new();
        clause.eq("status", &status).eq("supplier_id", &id);
        assert_eq!(clause.sql(), " WHERE status = @P1 AND supplier_id = @P2");
        assert_eq!(clause.params().len(), 2);
    }

    #[test]
    fn test_empty_where_clause() {
        assert_eq!(WhereClause::new().sql(), "");
    }

    #[test]
    fn test_pool_usage_percent() {
        let status = PoolStatus {
            total_connections: 16,
            idle_connections: 4,
            max_size: 20,
        };
        assert!((status.usage_percent() - 80.0).abs() < f64::EPSILON);
    }
}
