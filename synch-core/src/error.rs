//! Error types for synch-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `synch.yaml` was found in any of the searched locations.
    #[error("configuration file not found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// The configuration file exists but could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; serde_yaml includes the line and column.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
