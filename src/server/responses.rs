use crate::metrics::MetricsSnapshot;
use crate::models::classifier::ModelInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    #[serde(flatten)]
    pub model: ModelInfo,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub data: MetricsSnapshot,
}
