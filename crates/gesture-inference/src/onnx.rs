//! ONNX Runtime classifier backend.
//!
//! The gesture model is exported to ONNX with a single `[N, dim]` float input
//! and a `[N, K]` softmax output. The session is not re-entrant, so it sits
//! behind a mutex held only for the duration of one `run`.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use crate::classifier::{Classifier, Distribution};
use crate::error::{ClassifierError, ConfigError};
use crate::shape::FeatureBatch;

/// Gesture classifier running an ONNX model on CPU.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    input_dim: usize,
}

impl OnnxClassifier {
    /// Load the model file. Any failure here is a startup error.
    pub fn load(model_path: &Path, input_dim: usize) -> Result<Self, ConfigError> {
        if input_dim == 0 {
            return Err(ConfigError::InvalidDimension(input_dim));
        }
        if !model_path.exists() {
            return Err(ConfigError::ModelNotFound(model_path.to_path_buf()));
        }

        let model_bytes = std::fs::read(model_path).map_err(|source| ConfigError::Io {
            path: model_path.to_path_buf(),
            source,
        })?;

        let session = Session::builder()
            .map_err(|e| ConfigError::model_load(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ConfigError::model_load(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| ConfigError::model_load(format!("ORT load model: {e}")))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| ConfigError::model_load("model declares no outputs"))?;

        info!(
            path = %model_path.display(),
            input_dim,
            output = %output_name,
            "Gesture model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            input_dim,
        })
    }

    fn batch_tensor(batch: &FeatureBatch) -> Result<Value, ClassifierError> {
        let shape = vec![batch.len(), batch.dim()];
        Tensor::from_array((shape, batch.to_row_major().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| ClassifierError::backend(format!("ORT tensor: {e}")))
    }
}

impl Classifier for OnnxClassifier {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn classify(&self, batch: &FeatureBatch) -> Result<Distribution, ClassifierError> {
        let input = Self::batch_tensor(batch)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Poisoned)?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifierError::backend(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ClassifierError::invalid_output("ORT returned no outputs"))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::invalid_output(format!("ORT extract: {e}")))?;

        let rows = batch.len();
        let classes = match shape.len() {
            2 if shape[0] as usize == rows => shape[1] as usize,
            1 if rows == 1 => shape[0] as usize,
            _ => {
                return Err(ClassifierError::invalid_output(format!(
                    "expected {rows} probability rows, got shape {:?}",
                    shape
                )))
            }
        };
        debug!(rows, classes, "Classifier output extracted");

        Array2::from_shape_vec((rows, classes), data.to_vec())
            .map_err(|e| ClassifierError::invalid_output(format!("reshape: {e}")))
    }
}
