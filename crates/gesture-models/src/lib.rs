//! Shared data models for the gesture recognition backend.
//!
//! This crate provides Serde-serializable types for:
//! - Hand landmarks and the flattened 63-value feature layout
//! - Classification results and HTTP response bodies

pub mod landmarks;
pub mod prediction;

// Re-export common types
pub use landmarks::{
    HandLandmark, HandLandmarks, LandmarkCountError, AXES_PER_LANDMARK, FEATURE_DIM,
    LANDMARK_COUNT,
};
pub use prediction::{ClassificationResult, ErrorResponse, PredictionResponse};
