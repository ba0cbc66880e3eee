//! Scoring pipeline: request body -> features -> classifier -> percentage

use crate::error::RequestError;
use crate::feature_encoder::FeatureEncoder;
use crate::models::classifier::ProbabilityModel;
use crate::types::application::LoanApplication;
use crate::types::prediction::approval_percentage;
use std::sync::Arc;
use tracing::debug;

/// Runs the full approval computation against a shared classifier.
#[derive(Clone)]
pub struct ApprovalScorer {
    encoder: Arc<FeatureEncoder>,
    model: Arc<dyn ProbabilityModel>,
}

impl ApprovalScorer {
    pub fn new(model: Arc<dyn ProbabilityModel>) -> Self {
        Self {
            encoder: Arc::new(FeatureEncoder::new()),
            model,
        }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn model(&self) -> &dyn ProbabilityModel {
        self.model.as_ref()
    }

    /// Approval likelihood for an already parsed application
    pub fn score(&self, app: &LoanApplication) -> Result<f64, RequestError> {
        let features = self.encoder.encode(app);
        let [_, p_class1] = self.model.predict_proba(&features)?;
        let percentage = approval_percentage(p_class1);

        debug!(
            features = features.len(),
            p_class1 = p_class1,
            percentage = percentage,
            "Application scored"
        );

        Ok(percentage)
    }

    /// Approval likelihood straight from a raw request body
    pub fn score_body(&self, body: &[u8]) -> Result<f64, RequestError> {
        let app = LoanApplication::from_slice(body)?;
        self.score(&app)
    }
}
