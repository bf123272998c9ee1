use thiserror::Error;

/// Failure of a [`Document`](crate::Document) operation.
///
/// Every variant is recoverable: the document stays usable and the caller
/// decides whether to report, retry or prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    /// The source document could not be parsed. The document is unloaded.
    #[error("failed to load {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Save was requested for a document that has never been saved,
    /// without naming a target.
    #[error("no target path for a new document")]
    NoTargetPath,

    /// The engine rejected the write. In-memory state is untouched.
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A `GDAL` or `OGR` output format was given without a sub-driver.
    #[error("output format {0} needs a sub-driver")]
    MissingSubDriver(String),

    #[error("no document loaded")]
    NotLoaded,

    /// The engine refused a structural change (full layer table, unknown
    /// driver).
    #[error("rejected by the engine: {0}")]
    Rejected(String),
}

pub type DocResult<T = ()> = Result<T, DocError>;
