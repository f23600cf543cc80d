//! Shared API types
//!
//! Error responses and their mapping from query engine failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::DataError;
use crate::domain::query::QueryError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    MethodNotAllowed { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn method_not_allowed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "INTERNAL".to_string(),
            message: message.into(),
        }
    }

    pub fn from_data(e: DataError) -> Self {
        tracing::error!(error = %e, backend = e.backend(), "Data error");
        Self::internal("Database operation failed")
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        if e.is_configuration() {
            tracing::error!(error = %e, "Operation misconfigured");
            return Self::Internal {
                code: "OPERATION_MISCONFIGURED".to_string(),
                message: e.to_string(),
            };
        }
        match e {
            failed @ QueryError::StatementFailed(_) => {
                Self::bad_request("STATEMENT_FAILED", failed.to_string())
            }
            QueryError::Store(data) => Self::from_data(data),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::MethodNotAllowed { code, message } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                code,
                message,
            ),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { code, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                code,
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
