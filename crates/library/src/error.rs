//! Error types for library operations.

use clipvault_uploader::BackendError;

/// Errors produced while listing or sharing library content.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("no user selected")]
    NoUser,
}
