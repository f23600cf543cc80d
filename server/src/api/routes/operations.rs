//! Operation endpoints
//!
//! `GET /{name}` runs a query-all operation with query-string values.
//! `POST /{name}` runs an execute operation with query-string values
//! overlaid by the fields of a JSON object body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::data::QueryConnection;
use crate::domain::query::{
    OperationKind, OperationRegistry, QueryExecutor, RequestParams, ResultEnvelope, SqlOperation,
    StatementOutcome,
};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct OperationsApiState {
    pub registry: Arc<OperationRegistry>,
    pub database: Arc<dyn QueryConnection>,
}

impl OperationsApiState {
    fn lookup(&self, name: &str, expected: OperationKind) -> Result<Arc<SqlOperation>, ApiError> {
        let op = self.registry.get(name).ok_or_else(|| {
            ApiError::not_found(
                "OPERATION_NOT_FOUND",
                format!("Unknown operation '{}'", name),
            )
        })?;

        if op.kind != expected {
            return Err(ApiError::method_not_allowed(
                "WRONG_OPERATION_KIND",
                format!("Operation '{}' is a {} operation", name, op.kind),
            ));
        }
        Ok(op)
    }
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct OperationSummary {
    pub name: String,
    pub kind: OperationKind,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: OperationsApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_operations))
        .route("/{name}", get(run_query).post(run_statement))
        .with_state(state)
}

/// List configured operations
#[utoipa::path(
    get,
    path = "/api/v1/operations",
    tag = "operations",
    responses(
        (status = 200, description = "Configured operations", body = Vec<OperationSummary>)
    )
)]
pub async fn list_operations(
    State(state): State<OperationsApiState>,
) -> Json<Vec<OperationSummary>> {
    Json(
        state
            .registry
            .iter()
            .map(|op| OperationSummary {
                name: op.name.clone(),
                kind: op.kind,
            })
            .collect(),
    )
}

/// Run a query-all operation and return one page of results
#[utoipa::path(
    get,
    path = "/api/v1/operations/{name}",
    tag = "operations",
    params(
        ("name" = String, Path, description = "Operation name"),
        ("startIndex" = Option<i64>, Query, description = "Zero-based offset of the first row"),
        ("count" = Option<i64>, Query, description = "Requested page size"),
        ("filterBy" = Option<String>, Query, description = "Column to filter on"),
        ("filterOp" = Option<String>, Query, description = "Filter operator"),
        ("filterValue" = Option<String>, Query, description = "Filter value"),
        ("filterValueB" = Option<String>, Query, description = "Upper bound for between")
    ),
    responses(
        (status = 200, description = "Result page", body = ResultEnvelope),
        (status = 404, description = "Unknown operation"),
        (status = 405, description = "Operation is not a query"),
        (status = 500, description = "Operation misconfigured or store failure")
    )
)]
pub async fn run_query(
    State(state): State<OperationsApiState>,
    Path(name): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let op = state.lookup(&name, OperationKind::QueryAll)?;
    let request = RequestParams::from_pairs(pairs);

    let envelope = QueryExecutor::new(state.database.as_ref())
        .query_all(&op, &request)
        .await?;
    Ok(Json(envelope))
}

/// Run an execute operation
#[utoipa::path(
    post,
    path = "/api/v1/operations/{name}",
    tag = "operations",
    params(("name" = String, Path, description = "Operation name")),
    request_body(content = Object, description = "Named values for the statement", content_type = "application/json"),
    responses(
        (status = 200, description = "Statement executed", body = StatementOutcome),
        (status = 400, description = "Invalid body or statement failed"),
        (status = 404, description = "Unknown operation"),
        (status = 405, description = "Operation is not a statement"),
        (status = 500, description = "Operation misconfigured")
    )
)]
pub async fn run_statement(
    State(state): State<OperationsApiState>,
    Path(name): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<StatementOutcome>, ApiError> {
    let op = state.lookup(&name, OperationKind::Execute)?;
    let mut request = RequestParams::from_pairs(pairs);

    if !body.is_empty() {
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request("INVALID_BODY", format!("Invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(ApiError::bad_request(
                "INVALID_BODY",
                "Request body must be a JSON object",
            ));
        }
        request.extend_from_json(&value);
    }

    let outcome = QueryExecutor::new(state.database.as_ref())
        .execute(&op, &request)
        .await?;
    Ok(Json(outcome))
}
