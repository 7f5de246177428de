//! Error types for vision operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while loading or running head-pose predictors.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Unsupported model artifact: {0}")]
    UnsupportedModel(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl VisionError {
    /// Create a model load error.
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }

    /// Create a prediction failure error.
    pub fn prediction_failed(message: impl Into<String>) -> Self {
        Self::PredictionFailed(message.into())
    }
}
