//! Classifier loading and inference

pub mod classifier;
pub mod loader;

pub use classifier::{ModelInfo, OnnxClassifier, ProbabilityModel};
pub use loader::ModelLoader;
