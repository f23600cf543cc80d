//! Configured SQL operations and their registry

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::QueryError;
use super::filter::{ComparisonBinding, FILTER_PARAM_NAMES};
use super::params::MergePolicy;
use super::parser::referenced_names;
use super::template::{FILTER_MARKER, PlaceholderTemplate};

static COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("Invalid regex"));

/// What an operation does with its SQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Paginated, filterable listing
    #[default]
    QueryAll,
    /// Single data-modifying statement
    Execute,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryAll => "query_all",
            Self::Execute => "execute",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named SQL operation as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqlOperation {
    /// Set from the configuration key
    #[serde(skip)]
    pub name: String,
    pub kind: OperationKind,
    pub sql: String,
    /// Page size cap; values below 1 fall back to the default
    pub limit: i64,
    #[serde(alias = "builtinFiltering")]
    pub builtin_filtering: bool,
    #[serde(alias = "filteringColumns")]
    pub filtering_columns: Vec<String>,
    #[serde(alias = "comparisonBinding")]
    pub comparison_binding: ComparisonBinding,
    #[serde(alias = "mergePolicy")]
    pub merge_policy: MergePolicy,
}

impl Default for SqlOperation {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: OperationKind::QueryAll,
            sql: String::new(),
            limit: 0,
            builtin_filtering: false,
            filtering_columns: Vec::new(),
            comparison_binding: ComparisonBinding::default(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl SqlOperation {
    pub fn query_all(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn execute(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OperationKind::Execute,
            sql: sql.into(),
            ..Default::default()
        }
    }

    /// Enable the filter gate for the given columns
    pub fn with_filtering<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_filtering = true;
        self.filtering_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_comparison_binding(mut self, binding: ComparisonBinding) -> Self {
        self.comparison_binding = binding;
        self
    }

    /// Reject operations that cannot run correctly
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.name.trim().is_empty() {
            return Err(QueryError::configuration("Operation name is required"));
        }
        if self.sql.trim().is_empty() {
            return Err(QueryError::configuration(format!(
                "Operation '{}' has no SQL",
                self.name
            )));
        }

        if let Some(column) = self
            .filtering_columns
            .iter()
            .find(|c| !COLUMN_RE.is_match(c))
        {
            return Err(QueryError::configuration(format!(
                "Operation '{}' has invalid filtering column '{}'",
                self.name, column
            )));
        }

        if self.kind == OperationKind::QueryAll
            && self.builtin_filtering
            && self.merge_policy == MergePolicy::Reject
            && let Some(name) = referenced_names(&self.sql)
                .into_iter()
                .find(|n| FILTER_PARAM_NAMES.contains(&n.as_str()))
        {
            return Err(QueryError::configuration(format!(
                "Operation '{}' references reserved filter parameter '{}'",
                self.name, name
            )));
        }

        if self.kind == OperationKind::Execute
            && PlaceholderTemplate::new(&self.sql).has_marker()
        {
            return Err(QueryError::configuration(format!(
                "Operation '{}' is an execute operation and cannot contain {}",
                self.name, FILTER_MARKER
            )));
        }

        if self.kind == OperationKind::Execute && self.builtin_filtering {
            tracing::warn!(
                operation = %self.name,
                "Builtin filtering is ignored for execute operations"
            );
        }

        Ok(())
    }
}

/// Validated operations addressable by name
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<SqlOperation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration, naming each operation by its key
    pub fn from_config(operations: &BTreeMap<String, SqlOperation>) -> Result<Self, QueryError> {
        let mut registry = Self::new();
        for (name, op) in operations {
            let mut op = op.clone();
            op.name = name.clone();
            registry.register(op)?;
        }
        tracing::debug!(count = registry.len(), "Operations registered");
        Ok(registry)
    }

    /// Validate and add an operation; names must be unique
    pub fn register(&mut self, op: SqlOperation) -> Result<(), QueryError> {
        op.validate()?;
        if self.operations.contains_key(&op.name) {
            return Err(QueryError::configuration(format!(
                "Operation '{}' is already registered",
                op.name
            )));
        }
        tracing::trace!(operation = %op.name, kind = %op.kind, "Registered operation");
        self.operations.insert(op.name.clone(), Arc::new(op));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<SqlOperation>> {
        self.operations.get(name).cloned()
    }

    /// Operations in name order
    pub fn iter(&self) -> impl Iterator<Item = &SqlOperation> {
        self.operations.values().map(|op| op.as_ref())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
