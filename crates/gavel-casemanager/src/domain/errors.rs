//! Case manager error types.
//!
//! Rejections distinguish "that does not exist" (`*NotFound`), "you are not
//! allowed" (`NotAuthorized`), and "that is not currently valid"
//! (`InvalidState`). Persistence failures propagate unchanged.

use shared_types::ports::{BlobError, DirectoryError, StoreError};
use shared_types::{CaseId, EvidenceId, MotionId};
use thiserror::Error;

/// Result type alias for case manager operations.
pub type Result<T> = std::result::Result<T, CourtError>;

/// Errors surfaced by court operations.
#[derive(Debug, Error)]
pub enum CourtError {
    /// No active case under that id.
    #[error("case {0} does not exist")]
    CaseNotFound(CaseId),

    /// No queued motion under that id.
    #[error("motion {0} does not exist")]
    MotionNotFound(MotionId),

    /// No evidence filed under that id.
    #[error("evidence {0} does not exist")]
    EvidenceNotFound(EvidenceId),

    /// Caller lacks the capability the operation requires.
    #[error("you are not allowed to do that: this requires being {required}")]
    NotAuthorized {
        /// The missing capability, e.g. "a seated juror".
        required: String,
    },

    /// The operation is valid in principle but not in the case's current state.
    #[error("{0}")]
    InvalidState(String),

    /// Document store failure; propagates to the mutating caller.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Blob store failure.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Platform directory/gateway failure.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Sentence hand-off to the warden failed.
    #[error("sentence execution failed: {0}")]
    Sentence(String),
}
