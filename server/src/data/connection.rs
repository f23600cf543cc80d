//! Backend selection for the query connection

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{DatabaseBackend, DatabaseConfig};

use super::error::DataError;
use super::params::BoundParams;
use super::postgres::PostgresService;
use super::sql::SqlDialect;
use super::sqlite::SqliteService;
use super::traits::{ExecuteOutcome, JsonRow, QueryConnection};

/// Query connection service enum
///
/// Wraps the underlying backend-specific service (SQLite or PostgreSQL).
pub enum ConnectionService {
    /// SQLite backend (default, embedded)
    Sqlite(Arc<SqliteService>),
    /// PostgreSQL backend
    Postgres(Arc<PostgresService>),
}

impl ConnectionService {
    /// Open the backend named by the configuration
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        match config.backend {
            DatabaseBackend::Sqlite => {
                let service = SqliteService::init(config).await?;
                Ok(Self::Sqlite(Arc::new(service)))
            }
            DatabaseBackend::Postgres => {
                let service = PostgresService::init(config).await?;
                Ok(Self::Postgres(Arc::new(service)))
            }
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
            Self::Postgres(p) => p.close().await,
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    fn inner(&self) -> &dyn QueryConnection {
        match self {
            Self::Sqlite(s) => s.as_ref(),
            Self::Postgres(p) => p.as_ref(),
        }
    }
}

#[async_trait]
impl QueryConnection for ConnectionService {
    fn dialect(&self) -> &'static dyn SqlDialect {
        self.inner().dialect()
    }

    async fn ping(&self) -> Result<(), DataError> {
        self.inner().ping().await
    }

    async fn fetch_all(&self, sql: &str, params: &BoundParams) -> Result<Vec<JsonRow>, DataError> {
        self.inner().fetch_all(sql, params).await
    }

    async fn fetch_count(&self, sql: &str, params: &BoundParams) -> Result<i64, DataError> {
        self.inner().fetch_count(sql, params).await
    }

    async fn execute(
        &self,
        sql: &str,
        params: &BoundParams,
    ) -> Result<ExecuteOutcome, DataError> {
        self.inner().execute(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            backend: DatabaseBackend::Sqlite,
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_init_sqlite_in_memory() {
        let conn = ConnectionService::init(&sqlite_config("sqlite::memory:"))
            .await
            .unwrap();

        assert_eq!(conn.backend(), DatabaseBackend::Sqlite);
        assert_eq!(conn.dialect().name(), "sqlite");
        conn.ping().await.unwrap();

        conn.execute("CREATE TABLE t (a INTEGER)", &BoundParams::new())
            .await
            .unwrap();
        let count = conn
            .fetch_count("SELECT COUNT(*) FROM t", &BoundParams::new())
            .await
            .unwrap();
        assert_eq!(count, 0);
        conn.close().await;
    }

    #[tokio::test]
    async fn test_init_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let conn = ConnectionService::init(&sqlite_config(&url)).await.unwrap();
        conn.ping().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_init_requires_url() {
        let err = ConnectionService::init(&sqlite_config("")).await.err().unwrap();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[tokio::test]
    async fn test_init_postgres_rejects_bad_url() {
        let config = DatabaseConfig {
            backend: DatabaseBackend::Postgres,
            url: "not a url".to_string(),
            ..Default::default()
        };
        let err = ConnectionService::init(&config).await.err().unwrap();
        assert!(matches!(err, DataError::Config(_)));
    }
}
