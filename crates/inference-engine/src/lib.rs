//! ONNX Inference Engine
//!
//! Loads a pre-trained regression model with tract-onnx and runs it on
//! batches of single-feature samples.

mod batch;
mod engine;
mod regressor;

pub use batch::SampleBatch;
pub use engine::InferenceEngine;
pub use regressor::{run_inference, InferenceResult, PredictionRows, Regressor};

use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid output shape: expected {expected}, got {actual}")]
    InvalidOutputShape { expected: String, actual: String },
    #[error("Feature {index} is not representable as a finite 32-bit float")]
    NonFiniteInput { index: usize },
}
