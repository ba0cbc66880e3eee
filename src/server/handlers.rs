use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::InferenceError;
use crate::server::responses::{HealthResponse, MetricsResponse, ModelInfoResponse};
use crate::server::AppState;
use crate::types::prediction::DashboardResponse;

/// `POST /apply/results/dashboard`
///
/// Always answers 200. Failures come back as `{"error": ...}` so the
/// dashboard only has to look at which field is present. Scoring runs on
/// the blocking pool since the ONNX session is locked while it runs.
pub async fn score_application(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<DashboardResponse> {
    let start_time = Instant::now();
    let scorer = state.scorer.clone();
    let result = tokio::task::spawn_blocking(move || scorer.score_body(&body))
        .await
        .unwrap_or_else(|e| Err(InferenceError::Runtime(e.to_string()).into()));
    let latency = start_time.elapsed();

    match &result {
        Ok(percentage) => {
            state.metrics.record_prediction(latency, *percentage);
            info!(
                prediction = *percentage,
                latency_us = latency.as_micros() as u64,
                "Application scored"
            );
        }
        Err(e) => {
            state.metrics.record_error(latency, e.kind());
            warn!(
                kind = e.kind(),
                error = %e,
                latency_us = latency.as_micros() as u64,
                "Scoring request failed"
            );
        }
    }

    Json(DashboardResponse::from(result))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let encoder = state.scorer.encoder();
    Json(ModelInfoResponse {
        model: state.scorer.model().info(),
        feature_count: encoder.feature_count(),
        feature_names: encoder.feature_names(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        data: state.metrics.snapshot(),
    })
}
