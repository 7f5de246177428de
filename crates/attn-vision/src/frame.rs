//! Frame source contract.
//!
//! The camera driver and face mesh extractor live outside this workspace;
//! they are seen here only as a `FrameSource` that yields, per pull, either
//! the landmarks of the detected face or "no face".

use serde::{Deserialize, Serialize};

use crate::landmarks::LandmarkSet;

/// One captured frame after face mesh extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Landmarks of the detected face, if any.
    #[serde(default, rename = "landmarks")]
    pub face: Option<LandmarkSet>,
    /// Capture time in milliseconds since the stream started. Live sources
    /// leave this unset and frames are stamped on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<u64>,
}

impl Frame {
    pub fn with_face(width: u32, height: u32, face: LandmarkSet) -> Self {
        Self {
            width,
            height,
            face: Some(face),
            offset_ms: None,
        }
    }

    pub fn without_face(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            face: None,
            offset_ms: None,
        }
    }

    /// Stamp the frame with its capture offset.
    pub fn at_offset(mut self, offset_ms: u64) -> Self {
        self.offset_ms = Some(offset_ms);
        self
    }
}

/// Source of frames for one monitoring session.
pub trait FrameSource: Send {
    /// Pull the next frame. `None` ends the stream (exhausted or failed read).
    fn next_frame(&mut self) -> Option<Frame>;

    /// Release the underlying device. Must be idempotent.
    fn release(&mut self);

    /// Whether `release` has been called.
    fn is_released(&self) -> bool;
}

/// In-memory frame source, mostly for tests and replays.
#[derive(Debug, Default)]
pub struct VecFrameSource {
    frames: std::collections::VecDeque<Frame>,
    released: bool,
    release_count: usize,
}

impl VecFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            released: false,
            release_count: 0,
        }
    }

    /// How many times the device was actually released.
    pub fn release_count(&self) -> usize {
        self.release_count
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.released {
            return None;
        }
        self.frames.pop_front()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.release_count += 1;
        self.frames.clear();
    }

    fn is_released(&self) -> bool {
        self.released
    }
}
