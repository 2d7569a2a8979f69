//! `tracing` subscriber setup.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use synch_core::LogFormat;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::{io_err, DaemonError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: stderr always, plus `log_file` when given.
///
/// Honours `RUST_LOG`, defaulting to `info`. A second call is a no-op, so
/// tests and the one-shot commands can call it freely.
pub fn init_tracing(format: LogFormat, log_file: Option<&Path>) -> Result<(), DaemonError> {
    let mut layers: Vec<BoxedLayer> = vec![stderr_layer(format)];
    if let Some(path) = log_file {
        layers.push(file_layer(format, path)?);
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
    Ok(())
}

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn file_layer(format: LogFormat, path: &Path) -> Result<BoxedLayer, DaemonError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);
    Ok(match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_layer_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("logs").join("synch.log");
        file_layer(LogFormat::Text, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let err = file_layer(LogFormat::Json, dir.path()).err().unwrap();
        assert!(matches!(err, DaemonError::Io { .. }));
    }
}
