// Application Constants
// Centralized constants to avoid magic numbers

/// Default server configuration
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 4410;

/// Database connection pool defaults
pub const DEFAULT_DATABASE_PORT: u16 = 1433;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;

/// JWT configuration defaults
pub const DEFAULT_JWT_DURATION_HOURS: i64 = 8;
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Report export rate limiting (per user)
pub const DEFAULT_EXPORT_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Default report timezone
pub const DEFAULT_REPORT_TIMEZONE: &str = "UTC";

/// Supplier payment terms fallback, in days
pub const DEFAULT_PAYMENT_TERMS_DAYS: u16 = 30;

/// Pool monitoring interval
pub const POOL_MONITOR_INTERVAL_SECS: u64 = 60;
pub const POOL_HIGH_USAGE_THRESHOLD: f64 = 80.0;
pub const POOL_ELEVATED_USAGE_THRESHOLD: f64 = 70.0;

/// API response messages
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_FORBIDDEN: &str = "Insufficient permissions";
pub const MSG_INTERNAL_ERROR: &str = "Internal server error occurred";

/// Fallback shown by client providers when no server message is available
pub const MSG_GENERIC_FAILURE: &str = "An unexpected error occurred";
