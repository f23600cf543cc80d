//! Filter-to-SQL compilation and operation execution
//!
//! - `filter` - Single-column filter gate and predicate generation
//! - `template` - `{filterBy}` marker handling
//! - `parser` - `{name}` references to named placeholders
//! - `params` - Merging filter and template parameters
//! - `pagination` - Page window planning
//! - `operation` - Configured operations and their registry
//! - `executor` - Count, page and statement execution

pub mod error;
pub mod executor;
pub mod filter;
pub mod operation;
pub mod pagination;
pub mod params;
pub mod parser;
pub mod request;
pub mod template;

pub use error::QueryError;
pub use executor::{QueryExecutor, ResultEnvelope, StatementOutcome};
pub use filter::{ComparisonBinding, FilterRequest, FilterSpec, Operator};
pub use operation::{OperationKind, OperationRegistry, SqlOperation};
pub use pagination::PaginationPlan;
pub use params::MergePolicy;
pub use request::RequestParams;
pub use template::PlaceholderTemplate;
