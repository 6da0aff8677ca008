//! Shape validation.
//!
//! The classifier accepts `N x dim` batches. A single row is treated as a
//! batch of one; multi-row payloads must have every row of length `dim`.
//! Values are not range-checked: degraded captures can produce negative
//! coordinates or values above 1.0.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::ShapeError;
use crate::payload::RawFeatures;

/// One validated feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated `N x dim` input for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBatch {
    data: Array2<f32>,
}

impl FeatureBatch {
    /// Batch of one row.
    pub fn single(vector: FeatureVector) -> Self {
        Self {
            data: Array1::from(vector.0).insert_axis(Axis(0)),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Values per row.
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.data.row(idx)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Row-major values, ready to hand to a tensor.
    pub fn to_row_major(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}

/// Checks payloads against the classifier's input dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeValidator {
    expected: usize,
}

impl ShapeValidator {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Validate a single row.
    pub fn validate_row(&self, row: Vec<f32>) -> Result<FeatureVector, ShapeError> {
        self.check_len(row.len(), None)?;
        Ok(FeatureVector(row))
    }

    /// Validate a parsed payload into a batch.
    pub fn validate(&self, features: RawFeatures) -> Result<FeatureBatch, ShapeError> {
        match features {
            RawFeatures::Row(row) => self.validate_row(row).map(FeatureBatch::single),
            RawFeatures::Batch(rows) if rows.is_empty() => Err(ShapeError {
                expected: self.expected,
                got: 0,
                row: None,
            }),
            RawFeatures::Batch(rows) => {
                let mut data = Array2::zeros((rows.len(), self.expected));
                for (i, row) in rows.iter().enumerate() {
                    self.check_len(row.len(), Some(i))?;
                    data.row_mut(i).assign(&ArrayView1::from(row.as_slice()));
                }
                Ok(FeatureBatch { data })
            }
        }
    }

    fn check_len(&self, got: usize, row: Option<usize>) -> Result<(), ShapeError> {
        if got == self.expected {
            Ok(())
        } else {
            Err(ShapeError {
                expected: self.expected,
                got,
                row,
            })
        }
    }
}
