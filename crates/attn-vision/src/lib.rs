//! Face landmark geometry and attention classification.
//!
//! This crate provides:
//! - Eye aspect ratio over MediaPipe-style face meshes
//! - Head-pose predictors (JSON linear models, optional ONNX Runtime)
//! - Per-frame classification strategies (closure hysteresis, blink rate)
//! - The frame source contract and labelled dataset capture

pub mod blink_rate;
pub mod classifier;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod hysteresis;
pub mod landmarks;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;

pub use blink_rate::BlinkRateStrategy;
pub use classifier::{
    AttentionClassifier, ClassifierConfig, ClassifierPolicy, ClassifierPolicyParseError,
    ClassifierStrategy, EyeObservation,
};
pub use dataset::{class_name, dataset_header, DatasetWriter};
pub use error::{VisionError, VisionResult};
pub use frame::{Frame, FrameSource, VecFrameSource};
pub use hysteresis::HysteresisStrategy;
pub use landmarks::{
    average_ear, eye_aspect_ratio, EyeRegion, Landmark, LandmarkSet, FEATURE_LEN, LEFT_EYE,
    ML_LANDMARK_COUNT, RIGHT_EYE,
};
#[cfg(feature = "onnx")]
pub use onnx::OrtPredictor;
pub use predictor::{
    load_predictor, try_load_predictor, HeadPosePredictor, LinearModelArtifact, LinearPredictor,
    NullPredictor, PoseLabel,
};
