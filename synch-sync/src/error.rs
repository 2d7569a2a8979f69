//! Error types for synch-sync.

use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors that abort a whole pass. Per-file failures never surface here;
/// they are reported as [`crate::ActionOutcome::Failed`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local folder (or an entry in it) could not be read.
    #[error("I/O error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote listing could not be obtained; no safe decision is possible.
    #[error("remote listing failed: {0}")]
    Listing(#[source] RemoteError),
}

/// Convenience constructor for [`SyncError::LocalIo`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::LocalIo {
        path: path.into(),
        source,
    }
}
