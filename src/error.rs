//! Crate-wide error type.
//!
//! The compatibility core never fails. Everything that touches the disk,
//! the network or a child process reports through [`Error`]; the desktop
//! commands flatten it to a `String` at the frontend boundary.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid resume id: {0:?}")]
    InvalidId(String),

    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("no app data directory available on this platform")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, Error>;
