use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use iconlayout_core::{LayoutError, LayoutOptimizer, LayoutOutcome, LayoutRequest};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting icon layout API");

    let app = router();

    let addr = std::env::var("ICONLAYOUT_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Try: curl http://localhost:3000/api/health");

    axum::serve(listener, app).await?;
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/optimize", post(optimize))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "iconlayout-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main optimization endpoint.
///
/// Non-optimal statuses are regular 200 responses with `layout: null`.
async fn optimize(Json(request): Json<LayoutRequest>) -> Result<Json<LayoutOutcome>, AppError> {
    info!(
        "Received layout request with {} items and {} slots",
        request.items.len(),
        request.geometry.slot_count()
    );

    // The solver blocks, keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        let optimizer = LayoutOptimizer::new(request)?;
        optimizer.optimize()
    })
    .await
    .map_err(|err| AppError::Internal(err.into()))??;

    info!(
        "Optimization complete: status {}, objective {:?}",
        outcome.status,
        outcome.layout.as_ref().map(|l| l.objective)
    );

    Ok(Json(outcome))
}

/// Application error type
enum AppError {
    Layout(LayoutError),
    Internal(anyhow::Error),
}

impl From<LayoutError> for AppError {
    fn from(err: LayoutError) -> Self {
        AppError::Layout(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Layout(err @ LayoutError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Layout(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        error!("Request error: {}", message);

        (
            status,
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}
