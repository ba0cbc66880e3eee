//! ONNX model loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::ValueType;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// Artifact the session was built from
    pub path: PathBuf,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
    /// Feature width declared by the model, if fixed
    pub input_width: Option<usize>,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input = session
            .inputs
            .first()
            .context("Model declares no inputs")?;
        let input_name = input.name.clone();
        let input_width = declared_width(&input.input_type);

        // skl2onnx/onnxmltools exports name the pair "label" and "probabilities"
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            input_width = ?input_width,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            path: path.to_path_buf(),
            session,
            input_name,
            output_name,
            input_width,
        })
    }
}

/// Last dimension of a tensor input, when the model fixes it.
fn declared_width(input_type: &ValueType) -> Option<usize> {
    match input_type {
        ValueType::Tensor { shape, .. } => shape
            .iter()
            .last()
            .copied()
            .filter(|&dim| dim > 0)
            .map(|dim| dim as usize),
        _ => None,
    }
}
