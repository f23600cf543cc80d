//! Parameter merging

use serde::{Deserialize, Serialize};

pub use crate::data::params::{BoundParams, BoundValue};

use super::error::QueryError;

/// How a name present in both parameter sets is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Fail with a parameter conflict
    #[default]
    Reject,
    /// Filter binding wins because it is merged last
    Overwrite,
}

/// Combine template-bound parameters with filter-bound parameters.
///
/// Template parameters keep their order; filter parameters follow.
pub fn merge(
    filter_params: &BoundParams,
    template_params: &BoundParams,
    policy: MergePolicy,
) -> Result<BoundParams, QueryError> {
    let mut merged = template_params.clone();
    for (name, value) in filter_params.iter() {
        if merged.contains(name) {
            match policy {
                MergePolicy::Reject => {
                    return Err(QueryError::ParameterConflict {
                        name: name.to_string(),
                    });
                }
                MergePolicy::Overwrite => {
                    tracing::warn!(parameter = name, "Filter parameter overrides template parameter");
                }
            }
        }
        merged.insert(name, value.clone());
    }
    Ok(merged)
}
