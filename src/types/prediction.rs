//! Scoring response structures

use crate::error::RequestError;
use serde::Serialize;

/// Convert a classifier's class-1 probability into the approval percentage.
pub fn approval_percentage(p_class1: f64) -> f64 {
    (1.0 - p_class1) * 100.0
}

/// Body returned by the dashboard endpoint.
///
/// Always sent with status 200; callers tell the two apart by which field
/// is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DashboardResponse {
    Prediction { prediction: f64 },
    Error { error: String },
}

impl DashboardResponse {
    pub fn prediction(percentage: f64) -> Self {
        DashboardResponse::Prediction {
            prediction: percentage,
        }
    }
}

impl From<&RequestError> for DashboardResponse {
    fn from(err: &RequestError) -> Self {
        DashboardResponse::Error {
            error: err.to_string(),
        }
    }
}

impl From<Result<f64, RequestError>> for DashboardResponse {
    fn from(result: Result<f64, RequestError>) -> Self {
        match result {
            Ok(percentage) => DashboardResponse::prediction(percentage),
            Err(err) => DashboardResponse::from(&err),
        }
    }
}
