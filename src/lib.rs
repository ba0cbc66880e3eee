//! Loan Approval Service Library
//!
//! Scores loan applications with a pre-trained XGBoost classifier and
//! reports the approval likelihood over a single JSON endpoint.

pub mod config;
pub mod error;
pub mod feature_encoder;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scorer;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{InferenceError, RequestError};
pub use feature_encoder::FeatureEncoder;
pub use models::classifier::{OnnxClassifier, ProbabilityModel};
pub use scorer::ApprovalScorer;
pub use types::{application::LoanApplication, prediction::DashboardResponse};
