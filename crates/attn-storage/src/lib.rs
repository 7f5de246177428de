//! Session log storage.
//!
//! This crate provides:
//! - The `SessionStore` seam used by the recorder and the analytics
//! - A local directory store writing one CSV file per session
//! - The CSV codec for session logs

pub mod codec;
pub mod error;
pub mod store;

pub use codec::{decode_log, encode_log};
pub use error::{StorageError, StorageResult};
pub use store::{LocalSessionStore, SessionStore, StoredSession, LOG_EXTENSION};
