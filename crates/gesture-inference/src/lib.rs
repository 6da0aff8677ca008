//! Gesture inference pipeline.
//!
//! This crate provides:
//! - Payload parsing (JSON arrays and comma-separated scalars)
//! - Shape validation against the classifier's input dimension
//! - The `Classifier` contract and an ONNX Runtime backend
//! - Arg-max decoding against the loaded label set
//! - `InferenceService`, which chains the stages for one request
//! - A live adapter that feeds per-frame hand landmarks through the service

pub mod classifier;
pub mod decoder;
pub mod error;
pub mod labels;
pub mod live;
pub mod onnx;
pub mod payload;
pub mod service;
pub mod shape;

pub use classifier::{Classifier, Distribution};
pub use decoder::ResultDecoder;
pub use error::{
    ClassifierError, ConfigError, ErrorKind, InferenceError, InferenceResult, ParseError,
    ParseErrorKind, ShapeError,
};
pub use labels::LabelSet;
pub use live::{
    Frame, FrameOverlay, JsonLinesSource, LandmarkSource, LiveError, LiveSession, SourceError,
};
pub use onnx::OnnxClassifier;
pub use payload::{parse, RawFeatures};
pub use service::{InferenceService, ModelArtifacts};
pub use shape::{FeatureBatch, FeatureVector, ShapeValidator};
