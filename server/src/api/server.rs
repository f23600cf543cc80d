//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::health::{self, HealthState};
use super::routes::operations::{self, OperationsApiState};
use crate::core::CoreApp;
use crate::core::constants::{API_MAX_BODY_BYTES, API_PREFIX};
use crate::data::QueryConnection;
use crate::domain::query::OperationRegistry;

/// Assemble the full HTTP router
pub fn router(
    registry: Arc<OperationRegistry>,
    database: Arc<dyn QueryConnection>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let health_routes = Router::new()
        .route("/", get(health::health))
        .with_state(HealthState {
            database: database.clone(),
        });
    let operation_routes = operations::routes(OperationsApiState { registry, database });

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest(&format!("{}/health", API_PREFIX), health_routes)
        .nest(&format!("{}/operations", API_PREFIX), operation_routes)
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(API_MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered; returns CoreApp for cleanup
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let database: Arc<dyn QueryConnection> = app.database.clone();
        let router = router(app.operations.clone(), database, &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
