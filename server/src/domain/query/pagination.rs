//! Pagination planning

use serde::Serialize;

/// Page size used when an operation configures no positive limit
pub const DEFAULT_PAGE_LIMIT: i64 = 16;

/// Request field names carrying pagination
pub mod fields {
    pub const START_INDEX: &str = "startIndex";
    pub const COUNT: &str = "count";
}

/// Resolved `(start_index, count)` slice of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationPlan {
    pub start_index: i64,
    pub count: i64,
}

impl PaginationPlan {
    /// Clamp the requested window. Inputs are never rejected.
    pub fn plan(requested_start: i64, requested_count: i64, configured_limit: i64) -> Self {
        let start_index = requested_start.max(0);
        let limit = if configured_limit > 0 {
            configured_limit
        } else {
            DEFAULT_PAGE_LIMIT
        };
        let count = if (1..=limit).contains(&requested_count) {
            requested_count
        } else {
            limit
        };
        Self { start_index, count }
    }
}
