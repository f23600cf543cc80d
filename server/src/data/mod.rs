//! Data storage layer
//!
//! Runs operation SQL against the configured database:
//! - `sqlite` - Embedded SQLite backend
//! - `postgres` - PostgreSQL backend
//! - `connection` - Backend selection from configuration
//! - `traits` - Backend-agnostic query connection trait
//! - `params` - Values bound to named placeholders
//! - `placeholders` - Named to positional placeholder expansion
//! - `sql` - Dialect differences between backends
//! - `error` - Unified error type for all backends

pub mod connection;
pub mod error;
pub mod params;
pub mod placeholders;
pub mod postgres;
pub mod sql;
pub mod sqlite;
pub mod traits;

pub use connection::ConnectionService;
pub use error::DataError;
pub use params::{BoundParams, BoundValue};
pub use traits::{ExecuteOutcome, JsonRow, QueryConnection};
