// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "SqlGate";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "sqlgate";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".sqlgate";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "sqlgate.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SQLGATE_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "SQLGATE_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "SQLGATE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "SQLGATE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SQLGATE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5480;

/// Default log filter when neither SQLGATE_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,sqlgate=info,sqlgate_server=info";

/// Default log filter with --debug
pub const DEBUG_LOG_FILTER: &str = "info,sqlgate=debug,sqlgate_server=debug,tower_http=debug";

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for database backend (sqlite or postgres)
pub const ENV_DATABASE_BACKEND: &str = "SQLGATE_DATABASE_BACKEND";

/// Environment variable for database URL
pub const ENV_DATABASE_URL: &str = "SQLGATE_DATABASE_URL";

// =============================================================================
// Database Defaults
// =============================================================================

/// Default database URL (SQLite file in the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://sqlgate.db";

/// Connection pool max connections
pub const DATABASE_DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Seconds to wait for a pooled connection
pub const DATABASE_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL idle connection timeout in seconds
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// PostgreSQL statement timeout in seconds (0 disables)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// API
// =============================================================================

/// API route prefix
pub const API_PREFIX: &str = "/api/v1";

/// Maximum accepted JSON body size for execute requests
pub const API_MAX_BODY_BYTES: usize = 1024 * 1024;
