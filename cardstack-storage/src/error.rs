//! Error types for the storage layer.

use cardstack_types::MediaId;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a collaborator can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// One or more media ids do not resolve to an asset.
    #[error("unknown media: {0:?}")]
    UnknownMedia(Vec<MediaId>),

    /// Backend failure (connection, constraint, aborted unit of work).
    #[error("backend error: {0}")]
    Backend(String),
}
