//! Error taxonomy for the request path

use thiserror::Error;

/// Failures raised by the classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature shape mismatch, expected: {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced no probability output")]
    MissingOutput,

    #[error("model returned a non-finite probability: {0}")]
    InvalidProbability(f64),

    #[error("model runtime error: {0}")]
    Runtime(String),
}

/// Everything that can go wrong while serving one scoring request.
///
/// The handler turns each of these into a `{"error": ...}` body using the
/// `Display` text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl RequestError {
    /// Stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::MissingField(_) => "missing_field",
            RequestError::InvalidField { .. } => "invalid_field",
            RequestError::MalformedBody(_) => "malformed_body",
            RequestError::Inference(_) => "inference",
        }
    }
}
