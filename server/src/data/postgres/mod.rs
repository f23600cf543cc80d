//! PostgreSQL database service
//!
//! Runs operation queries against a PostgreSQL server with:
//! - Connection pooling with min/max bounds
//! - Idle connection cleanup
//! - Query timeout protection
//! - Parameters converted to the type the server infers for them

mod row;

pub use sqlx::PgPool;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Either, Executor, Statement, TypeInfo};
use tracing::log::LevelFilter;

use crate::core::config::DatabaseConfig;
use crate::core::constants::{
    DATABASE_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};

use super::error::DataError;
use super::params::{BoundParams, BoundValue, bind_values};
use super::placeholders::{ExpandedQuery, expand_named, expand_named_with};
use super::sql::{PostgresDialect, SqlDialect};
use super::traits::{ExecuteOutcome, JsonRow, QueryConnection};

/// Type names that can appear unquoted in a cast
static CAST_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\[\])?$").expect("Invalid regex"));

/// Wire type of a bound value
fn bound_type(value: &BoundValue) -> &'static str {
    match value {
        BoundValue::Null | BoundValue::Text(_) => "TEXT",
        BoundValue::Bool(_) => "BOOL",
        BoundValue::Int(_) => "INT8",
        BoundValue::Float(_) => "FLOAT8",
    }
}

/// Placeholder `$index`, cast to `inferred` when the value must be converted.
///
/// Text and NULL convert to any inferred type. Typed values only convert to
/// text so numeric comparisons never round.
fn coerced_placeholder(index: usize, value: &BoundValue, inferred: Option<&str>) -> String {
    let bound = bound_type(value);
    let Some(target) = inferred else {
        return format!("${}", index);
    };
    let convertible = match value {
        BoundValue::Null | BoundValue::Text(_) => true,
        _ => matches!(target, "TEXT" | "VARCHAR" | "BPCHAR" | "NAME"),
    };
    if convertible && !target.eq_ignore_ascii_case(bound) && CAST_TYPE_RE.is_match(target) {
        format!("CAST(${}::{} AS {})", index, bound, target)
    } else {
        format!("${}", index)
    }
}

/// PostgreSQL database service
///
/// Should be created once at server startup and shared across all modules.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    /// Initialize the database service from configuration
    ///
    /// - Min connections kept warm for low latency
    /// - Idle timeout to release unused connections
    /// - Statement timeout to prevent runaway queries
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let url = config.url.as_str();
        if url.is_empty() {
            return Err(DataError::Config("PostgreSQL URL is required".into()));
        }

        let max_connections = if config.max_connections > 0 {
            config.max_connections
        } else {
            DATABASE_DEFAULT_MAX_CONNECTIONS
        };

        let statement_timeout = if config.statement_timeout_secs > 0 {
            config.statement_timeout_secs
        } else {
            POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS
        };

        let mut options: PgConnectOptions = url
            .parse()
            .map_err(|e| DataError::Config(format!("Invalid PostgreSQL URL: {}", e)))?;

        options = options.log_statements(LevelFilter::Trace);

        // Set statement timeout at connection level for query protection
        if statement_timeout > 0 {
            options = options.options([("statement_timeout", format!("{}s", statement_timeout))]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(config.min_connections.min(max_connections))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs()))
            .idle_timeout(Duration::from_secs(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(DataError::from_postgres)?;

        tracing::debug!(
            max_connections,
            min_connections = config.min_connections,
            statement_timeout_secs = statement_timeout,
            "PostgresService initialized"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Expand named placeholders, converting each value to the type the
    /// server infers for its position.
    ///
    /// Falls back to the values' own types when the server cannot infer
    /// them; execution then reports any mismatch.
    async fn expand(&self, sql: &str, params: &BoundParams) -> Result<ExpandedQuery, DataError> {
        let expanded = expand_named(sql, params, self.dialect())?;
        if expanded.values.is_empty() {
            return Ok(expanded);
        }

        let inferred: Option<Vec<String>> = match (&self.pool).prepare(&expanded.sql).await {
            Ok(statement) => match statement.parameters() {
                Some(Either::Left(types)) => {
                    Some(types.iter().map(|t| t.name().to_string()).collect())
                }
                _ => None,
            },
            Err(e) => {
                tracing::debug!(error = %e, "Parameter types not inferred");
                None
            }
        };
        let Some(inferred) = inferred else {
            return Ok(expanded);
        };

        expand_named_with(sql, params, |index, value| {
            coerced_placeholder(index, value, inferred.get(index - 1).map(String::as_str))
        })
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl QueryConnection for PostgresService {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &PostgresDialect
    }

    async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        Ok(())
    }

    async fn fetch_all(&self, sql: &str, params: &BoundParams) -> Result<Vec<JsonRow>, DataError> {
        let expanded = self.expand(sql, params).await?;
        let rows = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        rows.iter().map(row::to_json).collect()
    }

    async fn fetch_count(&self, sql: &str, params: &BoundParams) -> Result<i64, DataError> {
        let expanded = self.expand(sql, params).await?;
        let row = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        row::count(&row)
    }

    async fn execute(
        &self,
        sql: &str,
        params: &BoundParams,
    ) -> Result<ExecuteOutcome, DataError> {
        let expanded = self.expand(sql, params).await?;
        let result = bind_values(sqlx::query(&expanded.sql), expanded.values)
            .execute(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        Ok(ExecuteOutcome {
            rows_affected: result.rows_affected(),
        })
    }
}
