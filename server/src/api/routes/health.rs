//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::data::QueryConnection;

#[derive(Clone)]
pub struct HealthState {
    pub database: Arc<dyn QueryConnection>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health(State(state): State<HealthState>) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = state.database.ping().await {
        tracing::warn!(error = %e, "Health check failed");
        return Err(ApiError::service_unavailable("Database unreachable"));
    }

    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    ))
}
