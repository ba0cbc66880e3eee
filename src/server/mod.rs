//! HTTP surface of the scoring service

pub mod handlers;
pub mod responses;

use crate::metrics::ServiceMetrics;
use crate::scorer::ApprovalScorer;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub scorer: ApprovalScorer,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(scorer: ApprovalScorer, metrics: Arc<ServiceMetrics>) -> Self {
        Self { scorer, metrics }
    }
}

/// Build the router with every route and the CORS layer.
///
/// An empty `allowed_origins` list accepts any origin. The body size limit is
/// lifted so oversized submissions still get a JSON answer from the handler.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/apply/results/dashboard", post(handlers::score_application))
        .route("/health", get(handlers::health))
        .route("/model", get(handlers::model_info))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
