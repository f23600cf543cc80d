//! Filter compiler
//!
//! Turns an untrusted single-column filter request into a SQL predicate and
//! splices it into a query template at the `{filterBy}` marker.
//!
//! Column names are interpolated into the SQL text, so the exact-match
//! allow-list check in [`FilterSpec::from_request`] is the only defense for
//! the identifier. Values are always bound as named parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::params::BoundParams;
use super::request::RequestParams;
use super::template::PlaceholderTemplate;

/// Predicate substituted when no filter applies
pub const ALWAYS_TRUE: &str = "(1 = 1)";

/// Parameter names the filter compiler may bind
pub const FILTER_PARAM_NAMES: &[&str] = &["filterValue", "filterValueA", "filterValueB"];

/// Request field names carrying the filter
pub mod fields {
    pub const FILTER_BY: &str = "filterBy";
    pub const FILTER_OP: &str = "filterOp";
    pub const FILTER_VALUE: &str = "filterValue";
    pub const FILTER_VALUE_B: &str = "filterValueB";
}

/// Supported filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Contains,
    Equals,
    StartsWith,
    Present,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Self::Contains,
        Self::Equals,
        Self::StartsWith,
        Self::Present,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Between,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "startswith",
            Self::Present => "present",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
        }
    }

    /// Case-insensitive lookup against the canonical names
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL.into_iter().find(|op| op.as_str() == lower)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How `ne`, `gt`, `gte`, `lt` and `lte` bind their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonBinding {
    /// Bind the value as given
    #[default]
    Exact,
    /// Bind `value%`, matching deployments built against the older behavior
    LegacyWildcard,
}

/// Raw filter fields as they arrive on the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub filter_by: Option<String>,
    pub filter_op: Option<String>,
    pub filter_value: Option<String>,
    pub filter_value_b: Option<String>,
}

impl FilterRequest {
    pub fn from_request(request: &RequestParams) -> Self {
        Self {
            filter_by: request.get_str(fields::FILTER_BY),
            filter_op: request.get_str(fields::FILTER_OP),
            filter_value: request.get_str(fields::FILTER_VALUE),
            filter_value_b: request.get_str(fields::FILTER_VALUE_B),
        }
    }
}

/// A filter request that passed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub operator: Operator,
    pub value: String,
    pub secondary_value: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

impl FilterSpec {
    /// Validate a raw request against the permitted columns.
    ///
    /// Returns `None` when any field is missing or empty, the operator is
    /// unknown, the column is not an exact member of `permitted_columns`, or
    /// `between` lacks its secondary value.
    pub fn from_request(request: &FilterRequest, permitted_columns: &[String]) -> Option<Self> {
        let column = non_empty(&request.filter_by)?;
        let op = non_empty(&request.filter_op)?;
        let value = non_empty(&request.filter_value)?;

        if !permitted_columns.iter().any(|c| c == column) {
            tracing::debug!(column, "Filter column not permitted");
            return None;
        }

        let Some(operator) = Operator::parse(op) else {
            tracing::debug!(operator = op, "Unknown filter operator");
            return None;
        };

        let secondary_value = match operator {
            Operator::Between => Some(non_empty(&request.filter_value_b)?.to_string()),
            _ => None,
        };

        Some(Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
            secondary_value,
        })
    }

    /// Generate the predicate and its bound parameters
    pub fn to_sql(&self, binding: ComparisonBinding) -> (String, BoundParams) {
        let col = &self.column;
        let mut params = BoundParams::new();

        let comparison_value = || match binding {
            ComparisonBinding::Exact => self.value.clone(),
            ComparisonBinding::LegacyWildcard => format!("{}%", self.value),
        };

        let sql = match self.operator {
            Operator::Contains => {
                params.insert("filterValue", format!("%{}%", self.value));
                format!("{} LIKE :filterValue", col)
            }
            Operator::Equals => {
                params.insert("filterValue", self.value.clone());
                format!("{} = :filterValue", col)
            }
            Operator::StartsWith => {
                params.insert("filterValue", format!("{}%", self.value));
                format!("{} LIKE :filterValue", col)
            }
            Operator::Present => format!("{} IS NOT NULL", col),
            Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                let op = match self.operator {
                    Operator::Ne => "!=",
                    Operator::Gt => ">",
                    Operator::Gte => ">=",
                    Operator::Lt => "<",
                    _ => "<=",
                };
                params.insert("filterValue", comparison_value());
                format!("{} {} :filterValue", col, op)
            }
            Operator::Between => {
                params.insert("filterValueA", self.value.clone());
                params.insert(
                    "filterValueB",
                    self.secondary_value.clone().unwrap_or_default(),
                );
                format!("{} BETWEEN :filterValueA AND :filterValueB", col)
            }
        };

        (sql, params)
    }
}

/// Result of compiling a filter into a template
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub query: String,
    pub params: BoundParams,
}

/// Splice the filter predicate into every marker of `template`.
///
/// A missing or invalid filter degrades to [`ALWAYS_TRUE`] with no
/// parameters. Parameters are only produced when the template actually
/// contains the marker.
pub fn compile(
    template: &PlaceholderTemplate,
    request: Option<&FilterRequest>,
    permitted_columns: &[String],
    binding: ComparisonBinding,
) -> CompiledFilter {
    let spec = request.and_then(|r| FilterSpec::from_request(r, permitted_columns));

    let Some(spec) = spec else {
        return CompiledFilter {
            query: template.replace_marker(ALWAYS_TRUE),
            params: BoundParams::new(),
        };
    };

    let (predicate, params) = spec.to_sql(binding);
    let params = if template.has_marker() {
        params
    } else {
        BoundParams::new()
    };

    tracing::debug!(
        column = %spec.column,
        operator = %spec.operator,
        "Filter applied"
    );

    CompiledFilter {
        query: template.replace_marker(&predicate),
        params,
    }
}
