//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, operations};
use crate::domain::query::{OperationKind, ResultEnvelope, StatementOutcome};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SqlGate API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Configured SQL operations over HTTP"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "operations", description = "Paginated queries and statements")
    ),
    paths(
        health::health,
        operations::list_operations,
        operations::run_query,
        operations::run_statement,
    ),
    components(schemas(
        health::HealthResponse,
        operations::OperationSummary,
        OperationKind,
        ResultEnvelope,
        StatementOutcome,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON spec
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SqlGate API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({
            url: '/api/openapi.json',
            dom_id: '#swagger-ui',
        });
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_operation_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/health"));
        assert!(paths.contains_key("/api/v1/operations"));
        assert!(paths.contains_key("/api/v1/operations/{name}"));
        assert!(doc["components"]["schemas"]["ResultEnvelope"].is_object());
    }
}
