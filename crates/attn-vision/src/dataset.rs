//! Labelled landmark capture for training head-pose models.
//!
//! Rows are `x0,y0,z0,...,x467,y467,z467,class`, one per captured frame.
//! The header is written only when the file is new or empty, so repeated
//! capture runs keep appending to the same dataset.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{VisionError, VisionResult};
use crate::landmarks::{LandmarkSet, FEATURE_LEN, ML_LANDMARK_COUNT};
use crate::predictor::PoseLabel;

/// Class column written for a pose label.
pub fn class_name(label: PoseLabel) -> &'static str {
    match label {
        PoseLabel::Distracted => "Distracted",
        PoseLabel::Other => "Attentive",
    }
}

/// CSV header for a landmark dataset.
pub fn dataset_header() -> String {
    let mut columns = Vec::with_capacity(FEATURE_LEN + 1);
    for i in 0..ML_LANDMARK_COUNT {
        columns.push(format!("x{i}"));
        columns.push(format!("y{i}"));
        columns.push(format!("z{i}"));
    }
    columns.push("class".to_string());
    columns.join(",")
}

/// Appends labelled landmark rows to a CSV file.
pub struct DatasetWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl DatasetWriter {
    /// Open `path` for appending, creating it (and the header) if needed.
    pub fn open(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);

        if needs_header {
            writeln!(writer, "{}", dataset_header())?;
            info!(path = %path.display(), "Created landmark dataset");
        }

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Append one labelled face. Meshes shorter than 468 points are rejected.
    pub fn append(&mut self, landmarks: &LandmarkSet, label: PoseLabel) -> VisionResult<()> {
        let features = landmarks
            .feature_vector()
            .ok_or(VisionError::FeatureMismatch {
                expected: FEATURE_LEN,
                actual: landmarks.len() * 3,
            })?;

        let mut line = String::with_capacity(features.len() * 10);
        for value in &features {
            line.push_str(&value.to_string());
            line.push(',');
        }
        line.push_str(class_name(label));

        writeln!(self.writer, "{line}")?;
        self.rows += 1;
        debug!(class = class_name(label), rows = self.rows, "Captured dataset row");
        Ok(())
    }

    /// Rows appended through this writer.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> VisionResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::face_with_openness;
    use crate::landmarks::Landmark;

    #[test]
    fn test_header_shape() {
        let header = dataset_header();
        let columns: Vec<&str> = header.split(',').collect();
        assert_eq!(columns.len(), FEATURE_LEN + 1);
        assert_eq!(&columns[..3], &["x0", "y0", "z0"]);
        assert_eq!(columns[FEATURE_LEN - 1], "z467");
        assert_eq!(columns[FEATURE_LEN], "class");
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("landmarks.csv");

        {
            let mut writer = DatasetWriter::open(&path).unwrap();
            writer.append(&face_with_openness(0.3), PoseLabel::Other).unwrap();
            writer.flush().unwrap();
        }
        {
            let mut writer = DatasetWriter::open(&path).unwrap();
            writer.append(&face_with_openness(0.3), PoseLabel::Distracted).unwrap();
            assert_eq!(writer.rows_written(), 1);
            writer.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("x0,y0,z0,"));
        assert!(lines[1].ends_with(",Attentive"));
        assert!(lines[2].ends_with(",Distracted"));
        assert_eq!(lines[1].split(',').count(), FEATURE_LEN + 1);
    }

    #[test]
    fn test_short_mesh_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DatasetWriter::open(dir.path().join("d.csv")).unwrap();
        let face = LandmarkSet::new(vec![Landmark::new(0.1, 0.1, 0.0); 10]);

        let err = writer.append(&face, PoseLabel::Other).unwrap_err();
        assert!(matches!(err, VisionError::FeatureMismatch { actual: 30, .. }));
        assert_eq!(writer.rows_written(), 0);
    }
}
