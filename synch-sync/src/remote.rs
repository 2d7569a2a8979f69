//! The capability interface the reconciler needs from a cloud provider.
//!
//! Implementations are the error-normalisation boundary: every provider
//! failure comes back as a [`RemoteError`] value, never as a panic.

use std::path::PathBuf;

use thiserror::Error;

use synch_core::{FileName, FileRecord};

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network failure, timeout, TLS or DNS problem.
    #[error("transport error: {0}")]
    Transport(String),

    /// The credential was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The target already exists and overwrite was not requested.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The local file to send could not be opened.
    #[error("cannot read {path}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::Conflict(_))
    }
}

/// Remote folder operations, all scoped to the configured remote folder and
/// addressed by file name.
///
/// Calls are blocking; the daemon runs passes on a blocking thread.
pub trait RemoteStore: Send + Sync {
    /// List the files in the remote folder. Directories may be returned; the
    /// snapshot builder drops them.
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError>;

    /// Create `name` remotely from the local file of the same name. Must not
    /// overwrite an existing remote file.
    fn upload(&self, name: &FileName) -> Result<(), RemoteError>;

    /// Overwrite `name` remotely with the local file of the same name.
    fn replace(&self, name: &FileName) -> Result<(), RemoteError>;

    /// Remove `name` from the remote folder.
    fn delete(&self, name: &FileName) -> Result<(), RemoteError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError> {
        (**self).list()
    }

    fn upload(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).upload(name)
    }

    fn replace(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).replace(name)
    }

    fn delete(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).delete(name)
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError> {
        (**self).list()
    }

    fn upload(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).upload(name)
    }

    fn replace(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).replace(name)
    }

    fn delete(&self, name: &FileName) -> Result<(), RemoteError> {
        (**self).delete(name)
    }
}
