//! ONNX Runtime head-pose predictor.
//!
//! Expects a classifier exported with integer class ids (e.g. skl2onnx with
//! `zipmap=False`): input `[1, 1404]` f32, output `output_label` as i64.

use std::path::Path;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};

use crate::error::{VisionError, VisionResult};
use crate::landmarks::FEATURE_LEN;
use crate::predictor::{HeadPosePredictor, PoseLabel};

/// Output holding the predicted class id.
const LABEL_OUTPUT: &str = "output_label";

/// Class id of "Distracted" when classes are sorted alphabetically
/// (`Attentive` = 0, `Distracted` = 1).
const DISTRACTED_CLASS_ID: i64 = 1;

/// ONNX Runtime wrapper for an exported head-pose classifier.
pub struct OrtPredictor {
    session: Mutex<Session>,
}

impl OrtPredictor {
    pub fn load(model_path: &Path) -> VisionResult<Self> {
        if !model_path.exists() {
            return Err(VisionError::ModelNotFound(model_path.to_path_buf()));
        }

        let model_bytes = std::fs::read(model_path)?;

        let session = Session::builder()
            .map_err(|e| VisionError::model_load(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| VisionError::model_load(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| VisionError::model_load(format!("ORT load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl HeadPosePredictor for OrtPredictor {
    fn predict(&self, features: &[f32]) -> VisionResult<PoseLabel> {
        if features.len() != FEATURE_LEN {
            return Err(VisionError::FeatureMismatch {
                expected: FEATURE_LEN,
                actual: features.len(),
            });
        }

        let shape = vec![1usize, FEATURE_LEN];
        let tensor = Tensor::from_array((shape, features.to_vec().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| VisionError::prediction_failed(format!("ORT tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::prediction_failed("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| VisionError::prediction_failed(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(LABEL_OUTPUT)
            .ok_or_else(|| VisionError::prediction_failed("ORT returned no label output"))?;

        let (_, labels) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| VisionError::prediction_failed(format!("ORT extract: {e}")))?;

        match labels.first() {
            Some(&DISTRACTED_CLASS_ID) => Ok(PoseLabel::Distracted),
            Some(_) => Ok(PoseLabel::Other),
            None => Err(VisionError::prediction_failed("ORT returned an empty label tensor")),
        }
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
