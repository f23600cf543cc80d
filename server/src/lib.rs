//! SqlGate: configured SQL operations served over HTTP
//!
//! Query-all operations compile an optional column filter into their SQL,
//! count the filtered result set and return one page of rows. Execute
//! operations run a single data-modifying statement.

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
