//! Attention monitoring sessions.
//!
//! This crate wires the classifier, the recorder and the session store into
//! a `SessionManager` holding at most one active session, and ships the
//! `attn-monitor` command-line tool for replayed captures.

pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod recorder;
pub mod replay;

pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use logging::SessionLogger;
pub use manager::{FrameOutcome, SessionManager};
pub use recorder::SessionRecorder;
pub use replay::ReplayFrameSource;
