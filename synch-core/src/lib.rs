//! Synch core library: file records, snapshots and configuration.
//!
//! - [`types`]: file names, records and per-pass snapshots
//! - [`config`]: `synch.yaml` discovery, parsing and validation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, LogFormat};
pub use error::ConfigError;
pub use types::{FileKind, FileName, FileRecord, Snapshot};
