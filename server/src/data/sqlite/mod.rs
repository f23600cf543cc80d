//! SQLite database service
//!
//! Runs operation queries against a local SQLite database file. The schema
//! is owned by whoever owns the database; this service never migrates it.

mod row;

pub use sqlx::SqlitePool;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::DatabaseConfig;
use crate::core::constants::{DATABASE_DEFAULT_MAX_CONNECTIONS, SQLITE_BUSY_TIMEOUT_SECS};

use super::error::DataError;
use super::params::{BoundParams, bind_values};
use super::placeholders::expand_named;
use super::sql::{SqlDialect, SqliteDialect};
use super::traits::{ExecuteOutcome, JsonRow, QueryConnection};

/// SQLite database service
///
/// Should be created once at server startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open a pool for the configured database URL
    ///
    /// In-memory databases are limited to one connection so every query
    /// sees the same database.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let url = config.url.as_str();
        if url.is_empty() {
            return Err(DataError::Config("SQLite URL is required".into()));
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DataError::Config(format!("Invalid SQLite URL: {}", e)))?
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .log_statements(LevelFilter::Trace);

        let max_connections = if url.contains(":memory:") {
            1
        } else if config.max_connections > 0 {
            config.max_connections
        } else {
            DATABASE_DEFAULT_MAX_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs()))
            .connect_with(options)
            .await
            .map_err(DataError::from_sqlite)?;

        tracing::debug!(url, max_connections, "SqliteService initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a SqliteService from an existing pool (primarily for testing)
    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}

#[async_trait]
impl QueryConnection for SqliteService {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &SqliteDialect
    }

    async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(())
    }

    async fn fetch_all(&self, sql: &str, params: &BoundParams) -> Result<Vec<JsonRow>, DataError> {
        let expanded = expand_named(sql, params, self.dialect())?;
        let rows = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        rows.iter().map(row::to_json).collect()
    }

    async fn fetch_count(&self, sql: &str, params: &BoundParams) -> Result<i64, DataError> {
        let expanded = expand_named(sql, params, self.dialect())?;
        let row = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        row::count(&row)
    }

    async fn execute(
        &self,
        sql: &str,
        params: &BoundParams,
    ) -> Result<ExecuteOutcome, DataError> {
        let expanded = expand_named(sql, params, self.dialect())?;
        let result = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .execute(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(ExecuteOutcome {
            rows_affected: result.rows_affected(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SqliteService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE contacts (id INTEGER PRIMARY KEY, name TEXT, score REAL, avatar BLOB)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO contacts (id, name, score, avatar) VALUES \
             (1, 'Ann', 1.5, x'0102'), (2, 'Bob', NULL, NULL), (3, 'Annie', 3.0, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        SqliteService::from_pool(pool)
    }

    #[tokio::test]
    async fn test_fetch_all_binds_named_params() {
        let svc = service().await;
        let params: BoundParams = [("filterValue", "%Ann%")].into_iter().collect();

        let rows = svc
            .fetch_all(
                "SELECT id, name FROM contacts WHERE name LIKE :filterValue ORDER BY id",
                &params,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[1]["name"], "Annie");
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[tokio::test]
    async fn test_fetch_all_decodes_column_types() {
        let svc = service().await;
        let rows = svc
            .fetch_all(
                "SELECT id, name, score, avatar FROM contacts WHERE id IN (1, 2) ORDER BY id",
                &BoundParams::new(),
            )
            .await
            .unwrap();

        assert_eq!(rows[0]["score"], 1.5);
        assert_eq!(rows[0]["avatar"], "AQI=");
        assert!(rows[1]["score"].is_null());
        assert!(rows[1]["avatar"].is_null());
    }

    #[tokio::test]
    async fn test_fetch_count_wrapped_query() {
        let svc = service().await;
        let sql = svc
            .dialect()
            .count_query("SELECT * FROM contacts WHERE id > :min");
        let params: BoundParams = [("min", crate::data::params::BoundValue::Int(1))]
            .into_iter()
            .collect();

        assert_eq!(svc.fetch_count(&sql, &params).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_modify_limit_query_pages() {
        let svc = service().await;
        let sql = svc.modify_limit_query("SELECT id FROM contacts ORDER BY id", 1, 1);
        let rows = svc.fetch_all(&sql, &BoundParams::new()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 2);
    }

    #[tokio::test]
    async fn test_execute_reports_rows_affected() {
        let svc = service().await;
        let params: BoundParams = [("name", "Zed")].into_iter().collect();

        let outcome = svc
            .execute("UPDATE contacts SET name = :name WHERE id <= 2", &params)
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 2);
    }

    #[tokio::test]
    async fn test_execute_invalid_sql_is_store_error() {
        let svc = service().await;
        let err = svc
            .execute("UPDATE missing SET a = 1", &BoundParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.backend(), "sqlite");
    }

    #[tokio::test]
    async fn test_unbound_placeholder() {
        let svc = service().await;
        let err = svc
            .fetch_all("SELECT * FROM contacts WHERE id = :id", &BoundParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::UnboundParameter { .. }));
    }

    #[tokio::test]
    async fn test_ping() {
        assert!(service().await.ping().await.is_ok());
    }
}
