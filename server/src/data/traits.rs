//! Connection trait for backend-agnostic query execution
//!
//! Implemented by the SQLite and PostgreSQL services. Queries arrive with
//! `:name` placeholders; each backend expands them to its native positional
//! syntax before handing them to the driver.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::DataError;
use super::params::BoundParams;
use super::sql::SqlDialect;

/// One result row, column name to JSON value, in select-list order
pub type JsonRow = Map<String, Value>;

/// Outcome of a data-modifying statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecuteOutcome {
    pub rows_affected: u64,
}

#[async_trait]
pub trait QueryConnection: Send + Sync {
    fn dialect(&self) -> &'static dyn SqlDialect;

    /// Round-trip a trivial statement to verify connectivity
    async fn ping(&self) -> Result<(), DataError>;

    /// Run a query and return every row
    async fn fetch_all(&self, sql: &str, params: &BoundParams) -> Result<Vec<JsonRow>, DataError>;

    /// Run a query whose first column of the first row is a row count
    async fn fetch_count(&self, sql: &str, params: &BoundParams) -> Result<i64, DataError>;

    /// Run a single data-modifying statement
    async fn execute(&self, sql: &str, params: &BoundParams)
    -> Result<ExecuteOutcome, DataError>;

    /// Restrict `sql` to a window of rows in this backend's syntax
    fn modify_limit_query(&self, sql: &str, limit: i64, offset: i64) -> String {
        self.dialect().modify_limit_query(sql, limit, offset)
    }
}
