//! Query engine error types

use thiserror::Error;

use crate::data::DataError;

#[derive(Error, Debug)]
pub enum QueryError {
    /// Malformed or missing operation configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Filter and template both bind the same parameter name
    #[error("Parameter '{name}' is bound by both the filter and the query template")]
    ParameterConflict { name: String },

    /// The store rejected a single statement execution
    #[error("Statement execution resulted in failure")]
    StatementFailed(#[source] DataError),

    /// Count or data query failed in the store
    #[error(transparent)]
    Store(#[from] DataError),
}

impl QueryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error stems from operation authoring rather than the request or store
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::ParameterConflict { .. }
                | Self::Store(DataError::UnboundParameter { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_conflict_display() {
        let err = QueryError::ParameterConflict {
            name: "filterValue".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'filterValue' is bound by both the filter and the query template"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_statement_failed_display() {
        let err = QueryError::StatementFailed(DataError::Config("boom".into()));
        assert_eq!(err.to_string(), "Statement execution resulted in failure");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_unbound_parameter_is_configuration() {
        let err = QueryError::from(DataError::unbound("status"));
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "No value bound for parameter 'status'");
    }
}
