//! Head-pose predictors.
//!
//! The classifier consults a `HeadPosePredictor` once per open-eye frame with
//! the flattened 468-point feature vector. Predictors are loaded once at
//! startup; a missing or broken artifact yields the `NullPredictor`, which the
//! classifier reports as `ModelMissing` instead of failing the session.
//!
//! Supported artifacts:
//! - `.json`: standardized logistic model ([`LinearModelArtifact`])
//! - `.onnx`: ONNX Runtime session (requires the `onnx` feature)

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{VisionError, VisionResult};
use crate::landmarks::FEATURE_LEN;

/// Binary head-pose verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLabel {
    /// Head turned away from the screen.
    Distracted,
    /// Anything else (facing the screen).
    Other,
}

impl PoseLabel {
    /// Map a class name from a trained model.
    pub fn from_class_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("distracted") {
            PoseLabel::Distracted
        } else {
            PoseLabel::Other
        }
    }
}

/// Capability for classifying head pose from landmark features.
pub trait HeadPosePredictor: Send + Sync {
    /// Classify one flattened feature vector.
    fn predict(&self, features: &[f32]) -> VisionResult<PoseLabel>;

    /// False for the null predictor.
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Stand-in used when no model could be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPredictor;

impl HeadPosePredictor for NullPredictor {
    fn predict(&self, _features: &[f32]) -> VisionResult<PoseLabel> {
        Err(VisionError::prediction_failed("no head-pose model loaded"))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Serialized standard-scaler + logistic-regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    /// Per-feature mean used for standardization.
    pub mean: Vec<f32>,
    /// Per-feature scale (standard deviation) used for standardization.
    pub scale: Vec<f32>,
    /// Logistic weights over standardized features.
    pub weights: Vec<f32>,
    /// Logistic bias.
    pub bias: f32,
    /// Class predicted when the decision value is positive.
    #[serde(default = "default_positive_class")]
    pub positive_class: String,
    /// Class predicted otherwise.
    #[serde(default = "default_negative_class")]
    pub negative_class: String,
}

fn default_positive_class() -> String {
    "Distracted".to_string()
}

fn default_negative_class() -> String {
    "Attentive".to_string()
}

/// Predictor backed by a [`LinearModelArtifact`].
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    artifact: LinearModelArtifact,
    positive: PoseLabel,
    negative: PoseLabel,
}

impl LinearPredictor {
    /// Validate an artifact; every vector must have [`FEATURE_LEN`] entries.
    pub fn new(artifact: LinearModelArtifact) -> VisionResult<Self> {
        for (field, len) in [
            ("mean", artifact.mean.len()),
            ("scale", artifact.scale.len()),
            ("weights", artifact.weights.len()),
        ] {
            if len != FEATURE_LEN {
                return Err(VisionError::model_load(format!(
                    "linear model field '{field}' has {len} entries, expected {FEATURE_LEN}"
                )));
            }
        }

        let positive = PoseLabel::from_class_name(&artifact.positive_class);
        let negative = PoseLabel::from_class_name(&artifact.negative_class);
        Ok(Self {
            artifact,
            positive,
            negative,
        })
    }

    /// Load a JSON artifact from disk.
    pub fn load(path: &Path) -> VisionResult<Self> {
        let bytes = std::fs::read(path)?;
        let artifact: LinearModelArtifact = serde_json::from_slice(&bytes)?;
        Self::new(artifact)
    }

    /// Signed decision value; positive means `positive_class`.
    pub fn decision(&self, features: &[f32]) -> VisionResult<f32> {
        if features.len() != FEATURE_LEN {
            return Err(VisionError::FeatureMismatch {
                expected: FEATURE_LEN,
                actual: features.len(),
            });
        }

        let a = &self.artifact;
        let mut z = a.bias;
        for i in 0..FEATURE_LEN {
            let scale = if a.scale[i] == 0.0 { 1.0 } else { a.scale[i] };
            z += a.weights[i] * (features[i] - a.mean[i]) / scale;
        }
        Ok(z)
    }
}

impl HeadPosePredictor for LinearPredictor {
    fn predict(&self, features: &[f32]) -> VisionResult<PoseLabel> {
        let z = self.decision(features)?;
        Ok(if z > 0.0 { self.positive } else { self.negative })
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Load a predictor from `path`, falling back to [`NullPredictor`].
///
/// Never fails: a missing or unreadable artifact is logged once here and the
/// classifier will report `ModelMissing` for open-eye frames.
pub fn load_predictor(path: &Path) -> Arc<dyn HeadPosePredictor> {
    match try_load_predictor(path) {
        Ok(predictor) => {
            info!(
                path = %path.display(),
                predictor = predictor.name(),
                "Loaded head-pose model"
            );
            predictor
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Head-pose model unavailable, head tracking disabled"
            );
            Arc::new(NullPredictor)
        }
    }
}

/// Load a predictor from `path`, reporting why it could not be loaded.
pub fn try_load_predictor(path: &Path) -> VisionResult<Arc<dyn HeadPosePredictor>> {
    if !path.exists() {
        return Err(VisionError::ModelNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Arc::new(LinearPredictor::load(path)?)),
        #[cfg(feature = "onnx")]
        "onnx" => Ok(Arc::new(crate::onnx::OrtPredictor::load(path)?)),
        other => Err(VisionError::UnsupportedModel(format!(
            "'{}' (extension '{}')",
            path.display(),
            other
        ))),
    }
}
