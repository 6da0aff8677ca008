//! Arg-max decoding of classifier output.

use ndarray::ArrayView1;
use tracing::error;

use gesture_models::ClassificationResult;

use crate::error::{ClassifierError, InferenceError, InferenceResult};
use crate::labels::LabelSet;

/// Turns a probability row into a label and confidence.
#[derive(Debug, Clone)]
pub struct ResultDecoder {
    labels: LabelSet,
}

impl ResultDecoder {
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Decode one row. Ties resolve to the lowest index; the confidence is the
    /// row maximum without renormalization.
    pub fn decode(&self, row: ArrayView1<'_, f32>) -> InferenceResult<ClassificationResult> {
        let (index, confidence) = argmax(row)?;

        let label = self.labels.get(index).ok_or_else(|| {
            error!(
                index,
                labels = self.labels.len(),
                artifact_skew = true,
                "Classifier produced a class index outside the label set"
            );
            InferenceError::LabelSetMismatch {
                index,
                labels: self.labels.len(),
            }
        })?;

        Ok(ClassificationResult::new(label, confidence))
    }
}

fn argmax(row: ArrayView1<'_, f32>) -> Result<(usize, f32), ClassifierError> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in row.iter().enumerate() {
        if !p.is_finite() {
            return Err(ClassifierError::invalid_output(format!(
                "non-finite probability at index {i}"
            )));
        }
        match best {
            Some((_, max)) if p <= max => {}
            _ => best = Some((i, p)),
        }
    }
    best.ok_or_else(|| ClassifierError::invalid_output("empty probability row"))
}
