//! Error type for the fallible edges of the crate
//!
//! The frame simulation never fails; only loading tuning files and decoding
//! snapshots or leaderboards can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

pub type Result<T> = std::result::Result<T, Error>;
