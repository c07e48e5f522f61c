//! REST API over the research pipeline.
//!
//! Handlers are stateless: every request carries the full topic chain, so
//! the service keeps no per-client state and horizontal scaling needs no
//! sticky sessions. The session type in [`crate::session`] serves embedded
//! and CLI callers; the HTTP surface rebuilds a chain per request instead.

mod handlers;

pub use handlers::{
    ContinueResearchRequest, MindMapRequest, RelatedTopicsRequest, RelatedTopicsResponse,
    ResearchRequest, ResearchResponse,
};

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::PolymathError;
use crate::gateway::ModelGateway;

/// Shared state: just the gateway handle. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ModelGateway>,
}

/// Error wrapper giving each pipeline failure an HTTP status.
///
/// Client mistakes (chain violations, empty topics) are 400s, upstream
/// model failures are 502s, and everything else is a 500. The body is
/// always `{"error": "..."}`.
pub struct ApiError(pub PolymathError);

impl<E: Into<PolymathError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PolymathError::Chain(_) => StatusCode::BAD_REQUEST,
            PolymathError::Gateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({"error": self.0.to_string()});
        (status, axum::Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health/", get(handlers::health))
        .route("/research/", post(handlers::research))
        .route("/continue-research/", post(handlers::continue_research))
        .route("/related-topics/", post(handlers::related_topics))
        .route("/mind-map/", post(handlers::mind_map))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until cancelled.
pub async fn serve(
    config: &ServerConfig,
    gateway: Arc<dyn ModelGateway>,
) -> Result<(), std::io::Error> {
    let app = router(AppState { gateway });
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "research API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
