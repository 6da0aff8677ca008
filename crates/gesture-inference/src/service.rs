//! Inference request pipeline.
//!
//! `InferenceService` is built once at startup from a classifier and a label
//! set and is read-only afterwards, so one instance can serve concurrent
//! requests. Each call runs parse, validate, classify and decode in order and
//! stops at the first failing stage.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, warn};

use gesture_models::{ClassificationResult, FEATURE_DIM};

use crate::classifier::Classifier;
use crate::decoder::ResultDecoder;
use crate::error::{ClassifierError, ConfigError, InferenceError, InferenceResult};
use crate::labels::LabelSet;
use crate::onnx::OnnxClassifier;
use crate::payload::{self, RawFeatures};
use crate::shape::ShapeValidator;

/// Locations of the artifacts the service is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub feature_dim: usize,
}

impl Default for ModelArtifacts {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            labels_path: PathBuf::from("labels.json"),
            feature_dim: FEATURE_DIM,
        }
    }
}

/// Parses, validates, classifies and decodes feature payloads.
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
    validator: ShapeValidator,
    decoder: ResultDecoder,
}

impl InferenceService {
    /// Bind a classifier to its label set. The input dimension comes from the
    /// classifier so the two cannot drift apart.
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelSet) -> Result<Self, ConfigError> {
        let dim = classifier.input_dim();
        if dim == 0 {
            return Err(ConfigError::InvalidDimension(dim));
        }

        Ok(Self {
            classifier,
            validator: ShapeValidator::new(dim),
            decoder: ResultDecoder::new(labels),
        })
    }

    /// Load the ONNX model and label set from disk.
    pub fn load(artifacts: &ModelArtifacts) -> Result<Self, ConfigError> {
        let classifier = OnnxClassifier::load(&artifacts.model_path, artifacts.feature_dim)?;
        let labels = LabelSet::from_path(&artifacts.labels_path)?;
        Self::new(Arc::new(classifier), labels)
    }

    pub fn feature_dim(&self) -> usize {
        self.validator.expected()
    }

    pub fn labels(&self) -> &LabelSet {
        self.decoder.labels()
    }

    /// Classify a raw payload, returning the result for its first row.
    pub fn handle(&self, raw: &str) -> InferenceResult<ClassificationResult> {
        self.handle_batch(raw)?
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::invalid_output("no probability rows").into())
    }

    /// Classify a raw payload, returning one result per row.
    pub fn handle_batch(&self, raw: &str) -> InferenceResult<Vec<ClassificationResult>> {
        let features = payload::parse(raw).map_err(|e| {
            warn!(error = %e, kind = %e.kind(), input = raw, "Failed to parse features");
            InferenceError::from(e)
        })?;
        self.classify_features(features)
    }

    /// Run already-parsed features through validation, the model and decoding.
    pub fn classify_features(
        &self,
        features: RawFeatures,
    ) -> InferenceResult<Vec<ClassificationResult>> {
        let batch = self.validator.validate(features).map_err(|e| {
            warn!(
                expected = e.expected,
                got = e.got,
                "Feature shape mismatch"
            );
            InferenceError::from(e)
        })?;
        debug!(rows = batch.len(), dim = batch.dim(), "Processed input shape");

        let distribution = self.classifier.classify(&batch).map_err(|e| {
            error!(error = %e, "Prediction failed");
            InferenceError::from(e)
        })?;

        if distribution.nrows() != batch.len() {
            let e = ClassifierError::invalid_output(format!(
                "expected {} probability rows, got {}",
                batch.len(),
                distribution.nrows()
            ));
            error!(error = %e, "Prediction failed");
            return Err(e.into());
        }

        distribution
            .rows()
            .into_iter()
            .map(|row| self.decoder.decode(row))
            .collect()
    }
}
