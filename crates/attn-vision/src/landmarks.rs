//! Face mesh landmarks and eye-aspect-ratio geometry.
//!
//! Landmarks arrive from the face mesh extractor as normalized `(x, y, z)`
//! points in MediaPipe order. The eye metrics run in pixel space, the
//! head-pose features use the normalized values directly.
//!
//! # Eye regions (MediaPipe 468-point mesh)
//!
//! Each region lists six indices `p0..p5`:
//! - `p0`, `p3`: eye corners (horizontal span)
//! - `p1`/`p5` and `p2`/`p4`: upper/lower eyelid pairs

use serde::{Deserialize, Serialize};

/// Number of landmarks that feed the head-pose predictor.
pub const ML_LANDMARK_COUNT: usize = 468;

/// Length of the flattened head-pose feature vector.
pub const FEATURE_LEN: usize = ML_LANDMARK_COUNT * 3;

/// Six ordered landmark indices outlining one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeRegion(pub [usize; 6]);

impl EyeRegion {
    /// Smallest landmark count that can serve this region.
    pub fn required_len(&self) -> usize {
        self.0.iter().max().map(|&i| i + 1).unwrap_or(0)
    }
}

pub const LEFT_EYE: EyeRegion = EyeRegion([33, 160, 158, 133, 153, 144]);
pub const RIGHT_EYE: EyeRegion = EyeRegion([362, 385, 387, 263, 373, 380]);

/// Single face landmark, normalized to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Integer pixel position in a `width` × `height` frame.
    #[inline]
    pub fn to_pixel(&self, width: u32, height: u32) -> (i64, i64) {
        (
            (self.x * width as f32) as i64,
            (self.y * height as f32) as i64,
        )
    }
}

impl From<[f32; 3]> for Landmark {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(lm: Landmark) -> Self {
        [lm.x, lm.y, lm.z]
    }
}

/// Ordered landmarks for one detected face in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Head-pose features: the first 468 points flattened as `x, y, z` triples.
    ///
    /// Refined meshes (478 points) are truncated; shorter sets return `None`.
    pub fn feature_vector(&self) -> Option<Vec<f32>> {
        if self.points.len() < ML_LANDMARK_COUNT {
            return None;
        }
        let mut features = Vec::with_capacity(FEATURE_LEN);
        for lm in &self.points[..ML_LANDMARK_COUNT] {
            features.extend_from_slice(&[lm.x, lm.y, lm.z]);
        }
        Some(features)
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

fn pixel_distance(a: (i64, i64), b: (i64, i64)) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Eye aspect ratio for one eye region.
///
/// `EAR = (|p1 - p5| + |p2 - p4|) / (2 * |p0 - p3|)`, measured in pixels.
/// Missing landmarks or a zero-width eye give `0.0`.
pub fn eye_aspect_ratio(
    landmarks: &LandmarkSet,
    region: &EyeRegion,
    width: u32,
    height: u32,
) -> f64 {
    if landmarks.len() < region.required_len() {
        return 0.0;
    }

    let px = |slot: usize| landmarks.points[region.0[slot]].to_pixel(width, height);

    let horizontal = pixel_distance(px(0), px(3));
    if horizontal == 0.0 {
        return 0.0;
    }

    let vertical_a = pixel_distance(px(1), px(5));
    let vertical_b = pixel_distance(px(2), px(4));
    (vertical_a + vertical_b) / (2.0 * horizontal)
}

/// Mean of the left and right eye aspect ratios.
pub fn average_ear(landmarks: &LandmarkSet, width: u32, height: u32) -> f64 {
    let left = eye_aspect_ratio(landmarks, &LEFT_EYE, width, height);
    let right = eye_aspect_ratio(landmarks, &RIGHT_EYE, width, height);
    (left + right) / 2.0
}

/// Test and replay helpers for building synthetic faces.
pub mod synthetic {
    use super::*;

    /// Place one eye in normalized coordinates with the given openness.
    ///
    /// The eye spans `width` horizontally; both eyelid pairs are `openness * width`
    /// apart, so in a square frame the eye's EAR equals `openness`.
    pub fn place_eye(
        points: &mut [Landmark],
        region: &EyeRegion,
        center: (f32, f32),
        width: f32,
        openness: f32,
    ) {
        let (cx, cy) = center;
        let half_w = width / 2.0;
        let half_h = openness * width / 2.0;
        let [p0, p1, p2, p3, p4, p5] = region.0;
        points[p0] = Landmark::new(cx - half_w, cy, 0.0);
        points[p3] = Landmark::new(cx + half_w, cy, 0.0);
        points[p1] = Landmark::new(cx - half_w / 3.0, cy - half_h, 0.0);
        points[p5] = Landmark::new(cx - half_w / 3.0, cy + half_h, 0.0);
        points[p2] = Landmark::new(cx + half_w / 3.0, cy - half_h, 0.0);
        points[p4] = Landmark::new(cx + half_w / 3.0, cy + half_h, 0.0);
    }

    /// A 478-point refined mesh with both eyes at the given openness.
    pub fn face_with_openness(openness: f32) -> LandmarkSet {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 478];
        place_eye(&mut points, &LEFT_EYE, (0.35, 0.4), 0.1, openness);
        place_eye(&mut points, &RIGHT_EYE, (0.65, 0.4), 0.1, openness);
        LandmarkSet::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::synthetic::face_with_openness;
    use super::*;

    #[test]
    fn test_eye_indices_fit_mesh() {
        assert!(LEFT_EYE.required_len() <= ML_LANDMARK_COUNT);
        assert!(RIGHT_EYE.required_len() <= ML_LANDMARK_COUNT);
        assert_eq!(RIGHT_EYE.required_len(), 388);
    }

    #[test]
    fn test_open_eye_ear() {
        let face = face_with_openness(0.3);
        let ear = average_ear(&face, 1000, 1000);
        assert!((ear - 0.3).abs() < 0.02, "open eye EAR should be ~0.3: {ear}");
    }

    #[test]
    fn test_closed_eye_lower_than_open() {
        let open = average_ear(&face_with_openness(0.3), 640, 480);
        let closed = average_ear(&face_with_openness(0.05), 640, 480);
        assert!(closed < open);
        assert!(closed < 0.25);
    }

    #[test]
    fn test_zero_width_eye_is_zero() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 468];
        points[160] = Landmark::new(0.5, 0.4, 0.0);
        let face = LandmarkSet::new(points);
        assert_eq!(eye_aspect_ratio(&face, &LEFT_EYE, 640, 480), 0.0);
    }

    #[test]
    fn test_short_landmark_set_is_zero() {
        let face = LandmarkSet::new(vec![Landmark::new(0.1, 0.2, 0.0); 100]);
        assert_eq!(eye_aspect_ratio(&face, &LEFT_EYE, 640, 480), 0.0);
        assert_eq!(average_ear(&face, 640, 480), 0.0);
        assert_eq!(average_ear(&LandmarkSet::default(), 640, 480), 0.0);
    }

    #[test]
    fn test_ear_never_negative() {
        for openness in [0.0, 0.01, 0.1, 0.25, 0.5, 1.0] {
            let ear = average_ear(&face_with_openness(openness), 320, 240);
            assert!(ear >= 0.0);
        }
    }

    #[test]
    fn test_feature_vector_truncates_refined_mesh() {
        let face = face_with_openness(0.3);
        assert_eq!(face.len(), 478);

        let features = face.feature_vector().unwrap();
        assert_eq!(features.len(), FEATURE_LEN);
        let lm = face.get(33).unwrap();
        assert_eq!(&features[33 * 3..33 * 3 + 3], &[lm.x, lm.y, lm.z]);
    }

    #[test]
    fn test_feature_vector_requires_full_mesh() {
        let face = LandmarkSet::new(vec![Landmark::new(0.0, 0.0, 0.0); 467]);
        assert!(face.feature_vector().is_none());
    }

    #[test]
    fn test_landmark_serde_as_triple() {
        let set: LandmarkSet = serde_json::from_str("[[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1), Some(&Landmark::new(0.4, 0.5, 0.6)));
    }
}
