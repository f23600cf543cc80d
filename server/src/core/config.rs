use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::query::SqlOperation;

use super::banner::redact_url;
use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DATABASE_DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_URL,
    DEFAULT_HOST, DEFAULT_PORT,
};

// =============================================================================
// Database Backend Enum (SQLite or PostgreSQL)
// =============================================================================

/// Database that operations run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Postgres,
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Postgres => write!(f, "postgres"),
        }
    }
}

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section (from JSON config file)
#[derive(Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub backend: Option<DatabaseBackend>,
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub statement_timeout_secs: Option<u64>,
}

impl fmt::Debug for DatabaseFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseFileConfig")
            .field("backend", &self.backend)
            .field("url", &self.url.as_deref().map(redact_url))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .finish()
    }
}

/// Raw JSON config file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub operations: Option<BTreeMap<String, SqlOperation>>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    ///
    /// Operations are replaced whole by name, never merged field by field.
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if database.url.is_some() {
                tracing::trace!("Merging database.url");
                current.url = database.url;
            }
            if database.max_connections.is_some() {
                current.max_connections = database.max_connections;
            }
            if database.min_connections.is_some() {
                current.min_connections = database.min_connections;
            }
            if database.acquire_timeout_secs.is_some() {
                current.acquire_timeout_secs = database.acquire_timeout_secs;
            }
            if database.statement_timeout_secs.is_some() {
                current.statement_timeout_secs = database.statement_timeout_secs;
            }
        }

        if let Some(operations) = other.operations {
            let current = self.operations.get_or_insert_with(BTreeMap::new);
            for (name, op) in operations {
                tracing::trace!(operation = %name, "Merging operation");
                current.insert(name, op);
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration (final/runtime)
#[derive(Clone, Default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    /// 0 selects the backend default
    pub max_connections: u32,
    pub min_connections: u32,
    /// 0 selects the backend default
    pub acquire_timeout_secs: u64,
    /// PostgreSQL only; 0 selects the backend default
    pub statement_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("url", &redact_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Acquire timeout with the default applied
    pub fn acquire_timeout_secs(&self) -> u64 {
        if self.acquire_timeout_secs > 0 {
            self.acquire_timeout_secs
        } else {
            DATABASE_DEFAULT_ACQUIRE_TIMEOUT_SECS
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub operations: BTreeMap<String, SqlOperation>,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.sqlgate/sqlgate.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_home(path);
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(file_config, cli);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            debug = config.debug,
            database_backend = %config.database.backend,
            operations = config.operations.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults, file values and CLI/env overrides
    fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let database = DatabaseConfig {
            backend: cli
                .database_backend
                .or(file_database.backend)
                .unwrap_or_default(),
            url: cli
                .database_url
                .clone()
                .or(file_database.url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: file_database.max_connections.unwrap_or(0),
            min_connections: file_database.min_connections.unwrap_or(0),
            acquire_timeout_secs: file_database.acquire_timeout_secs.unwrap_or(0),
            statement_timeout_secs: file_database.statement_timeout_secs.unwrap_or(0),
        };

        Self {
            server: ServerConfig { host, port },
            database,
            operations: file_config.operations.unwrap_or_default(),
            debug: cli.debug || file_config.debug.unwrap_or(false),
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would cause bind failure
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.url.trim().is_empty() {
            anyhow::bail!("Configuration error: database.url must not be empty");
        }

        if self.database.backend == DatabaseBackend::Postgres
            && !self.database.url.starts_with("postgres")
        {
            anyhow::bail!(
                "Configuration error: database.url must be a postgres:// URL for the postgres backend"
            );
        }

        if self.operations.is_empty() {
            tracing::warn!("No operations configured");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.sqlgate/sqlgate.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Whether a bind host listens on every interface
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
