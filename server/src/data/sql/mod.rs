//! SQL dialects for the supported backends
//!
//! Dialects decide placeholder syntax and how a query is wrapped for
//! counting and paging on each backend.

mod dialect;
mod postgres_dialect;
mod sqlite_dialect;

pub use dialect::SqlDialect;
pub use postgres_dialect::PostgresDialect;
pub use sqlite_dialect::SqliteDialect;
