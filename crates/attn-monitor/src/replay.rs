//! JSON-lines replay of captured landmark frames.
//!
//! One frame per line:
//!
//! ```text
//! {"width":640,"height":480,"landmarks":[[0.41,0.39,-0.02], ...]}
//! {"width":640,"height":480,"landmarks":null,"offset_ms":66}
//! ```
//!
//! Blank lines are skipped. An unparsable line ends the stream, the same way
//! a failed camera read does.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use attn_vision::{Frame, FrameSource};
use tracing::{debug, warn};

use crate::error::{MonitorError, MonitorResult};

/// Frame source reading a JSON-lines capture.
pub struct ReplayFrameSource {
    reader: Option<Box<dyn BufRead + Send>>,
    line_no: usize,
    frames_read: usize,
    last_error: Option<MonitorError>,
    released: bool,
}

impl ReplayFrameSource {
    /// Open a capture file.
    pub fn open(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened replay capture");
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            line_no: 0,
            frames_read: 0,
            last_error: None,
            released: false,
        }
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Why the stream ended early, if it did.
    pub fn last_error(&self) -> Option<&MonitorError> {
        self.last_error.as_ref()
    }

    fn read_frame(&mut self) -> MonitorResult<Option<Frame>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let frame = serde_json::from_str(line.trim())
            .map_err(|e| MonitorError::replay(self.line_no, e.to_string()))?;
        Ok(Some(frame))
    }
}

impl FrameSource for ReplayFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        match self.read_frame() {
            Ok(Some(frame)) => {
                self.frames_read += 1;
                Some(frame)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Replay read failed, ending stream");
                self.last_error = Some(e);
                self.reader = None;
                None
            }
        }
    }

    fn release(&mut self) {
        self.reader = None;
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(text: &str) -> ReplayFrameSource {
        ReplayFrameSource::from_reader(Cursor::new(text.to_string()))
    }

    #[test]
    fn test_reads_frames_and_skips_blank_lines() {
        let mut src = source(concat!(
            "{\"width\":640,\"height\":480,\"landmarks\":null}\n",
            "\n",
            "{\"width\":640,\"height\":480,\"landmarks\":[[0.1,0.2,0.0]],\"offset_ms\":33}\n",
        ));

        assert!(src.next_frame().unwrap().face.is_none());
        let second = src.next_frame().unwrap();
        assert_eq!(second.offset_ms, Some(33));
        assert!(src.next_frame().is_none());
        assert_eq!(src.frames_read(), 2);
        assert!(src.last_error().is_none());
    }

    #[test]
    fn test_bad_line_ends_stream() {
        let mut src = source(
            "{\"width\":640,\"height\":480}\nnot json\n{\"width\":640,\"height\":480}\n",
        );

        assert!(src.next_frame().is_some());
        assert!(src.next_frame().is_none());
        assert!(src.next_frame().is_none());
        assert!(matches!(src.last_error(), Some(MonitorError::Replay { line: 2, .. })));
        assert!(!src.is_released());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut src = source("{\"width\":1,\"height\":1}\n");
        src.release();
        src.release();
        assert!(src.is_released());
        assert!(src.next_frame().is_none());
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(matches!(
            ReplayFrameSource::open("/nonexistent/capture.jsonl"),
            Err(MonitorError::Io(_))
        ));
    }
}
