//! Classification contract.

use ndarray::Array2;

use crate::error::ClassifierError;
use crate::shape::FeatureBatch;

/// `N x K` probabilities, one row per input row, one column per label.
pub type Distribution = Array2<f32>;

/// Maps validated feature rows to probability distributions over the label set.
///
/// Implementations are shared across requests and must tolerate concurrent
/// calls. Backends that are not re-entrant serialize inside `classify`.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Values per input row this model was trained on.
    fn input_dim(&self) -> usize;

    /// Run the model on a batch.
    fn classify(&self, batch: &FeatureBatch) -> Result<Distribution, ClassifierError>;
}
