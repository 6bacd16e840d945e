//! Warden error types.

use shared_types::ports::{DirectoryError, StoreError};
use shared_types::UserId;
use thiserror::Error;

/// Result type alias for warden operations.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum WardenError {
    /// No ledger entry for that user.
    ///
    /// Never returned by `new_warrant`, which creates the prisoner implicitly.
    #[error("no prisoner record for user {0}")]
    PrisonerNotFound(UserId),

    /// No warrant under that id for the user.
    #[error("warrant {0} does not exist")]
    WarrantNotFound(String),

    /// Document store failure; propagates to the mutating caller.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Role mutation through the platform gateway failed.
    #[error(transparent)]
    Gateway(#[from] DirectoryError),
}
