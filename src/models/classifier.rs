//! Binary classifier used to score loan applications

use crate::error::InferenceError;
use crate::models::loader::{LoadedModel, ModelLoader};
use anyhow::Result;
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Anything that can return `[P(class 0), P(class 1)]` for a feature vector.
///
/// The service holds one of these for its whole lifetime and never mutates
/// it, so tests can swap in a fixed-output double.
pub trait ProbabilityModel: Send + Sync {
    /// Class probabilities for a single feature vector
    fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], InferenceError>;

    /// Descriptive metadata for the model endpoint
    fn info(&self) -> ModelInfo;
}

/// Model metadata reported by the service
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub path: Option<String>,
    pub input_width: Option<usize>,
}

/// XGBoost classifier exported to ONNX and run with ONNX Runtime
pub struct OnnxClassifier {
    /// Sessions need exclusive access while running
    model: Mutex<LoadedModel>,
}

impl OnnxClassifier {
    /// Load the classifier artifact
    pub fn load(path: &str, name: &str, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let model = loader.load_model(path, name)?;

        info!(
            model = %model.name,
            input_width = ?model.input_width,
            "Classifier ready"
        );

        Ok(Self {
            model: Mutex::new(model),
        })
    }

    fn run(&self, model: &mut LoadedModel, features: &[f32]) -> Result<[f64; 2], InferenceError> {
        use ort::value::Tensor;

        if let Some(expected) = model.input_width {
            if expected != features.len() {
                return Err(InferenceError::ShapeMismatch {
                    expected,
                    actual: features.len(),
                });
            }
        }

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec())).map_err(runtime)?;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])
            .map_err(runtime)?;

        let pair = extract_probabilities(&outputs, &model.output_name, &model.name)?;
        checked(pair)
    }
}

impl ProbabilityModel for OnnxClassifier {
    fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], InferenceError> {
        let mut model = self
            .model
            .lock()
            .map_err(|e| InferenceError::Runtime(format!("Lock error: {}", e)))?;
        self.run(&mut model, features)
    }

    fn info(&self) -> ModelInfo {
        match self.model.lock() {
            Ok(model) => ModelInfo {
                name: model.name.clone(),
                path: Some(model.path.display().to_string()),
                input_width: model.input_width,
            },
            Err(_) => ModelInfo {
                name: "unavailable".to_string(),
                path: None,
                input_width: None,
            },
        }
    }
}

fn runtime(e: ort::Error) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

/// Pull the class probability pair out of the session outputs.
///
/// XGBoost exports emit a `[batch, 2]` float tensor; ZipMap-style exports
/// emit `seq(map(int64, float))`.
fn extract_probabilities(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<[f64; 2], InferenceError> {
    if let Some(output) = outputs.get(output_name) {
        if let Some(pair) = probabilities_from_value(output, model_name) {
            return Ok(pair);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(pair) = probabilities_from_value(&output, model_name) {
            debug!(model = %model_name, output = %name, "Extracted probabilities (fallback)");
            return Ok(pair);
        }
    }

    warn!(model = %model_name, "No probability output found");
    Err(InferenceError::MissingOutput)
}

fn probabilities_from_value(output: &ort::value::DynValue, model_name: &str) -> Option<[f64; 2]> {
    let dtype = output.dtype();

    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let pair = probabilities_from_tensor(&dims, data);
        debug!(model = %model_name, probabilities = ?pair, "Extracted from tensor");
        return pair;
    }

    if DynSequenceValueType::can_downcast(&dtype) {
        match probabilities_from_sequence_map(output) {
            Ok(pair) => {
                debug!(model = %model_name, probabilities = ?pair, "Extracted from seq(map)");
                return Some(pair);
            }
            Err(e) => warn!(model = %model_name, error = %e, "Unreadable seq(map) output"),
        }
    }

    None
}

/// Read the first map of a `seq(map(int64, float))` output
fn probabilities_from_sequence_map(output: &ort::value::DynValue) -> Result<[f64; 2]> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let first = maps
        .first()
        .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;

    let kv_pairs = first.try_extract_key_values::<i64, f32>()?;
    let lookup = |class: i64| {
        kv_pairs
            .iter()
            .find(|(class_id, _)| *class_id == class)
            .map(|(_, prob)| *prob as f64)
    };

    match (lookup(0), lookup(1)) {
        (Some(p0), Some(p1)) => Ok([p0, p1]),
        (None, Some(p1)) => Ok([1.0 - p1, p1]),
        (Some(p0), None) => Ok([p0, 1.0 - p0]),
        (None, None) => Err(anyhow::anyhow!("No probability found in map")),
    }
}

/// Interpret a probability tensor for a batch of one.
///
/// `[1, 2]` / `[2]` hold both classes; `[1, 1]` / `[1]` hold class 1 only.
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Option<[f64; 2]> {
    let classes = match dims {
        [1, n] | [n] => *n,
        _ => return None,
    };

    match (classes, data) {
        (2, [p0, p1, ..]) => Some([*p0 as f64, *p1 as f64]),
        (1, [p1, ..]) => Some([1.0 - *p1 as f64, *p1 as f64]),
        _ => None,
    }
}

fn checked(pair: [f64; 2]) -> Result<[f64; 2], InferenceError> {
    match pair.iter().find(|p| !p.is_finite()) {
        Some(&bad) => Err(InferenceError::InvalidProbability(bad)),
        None => Ok(pair),
    }
}
