use thiserror::Error;

/// Errors reported by a [`MapEngine`](crate::MapEngine).
///
/// Callers of the engine are not expected to inspect these beyond logging:
/// the editor only distinguishes "it worked" from "it did not".
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse mapfile {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("failed to serialize mapfile: {0}")]
    Serialize(String),
    #[error("no such mapfile: {0}")]
    NotFound(String),
    #[error("renderer produced no image: {0}")]
    NoImage(String),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
