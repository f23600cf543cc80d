//! Domain logic
//!
//! - `query` - Filter compilation, parameter handling and operation execution

pub mod query;
