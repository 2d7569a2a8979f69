use std::path::Path;

use synch_core::Config;
use synch_sync::Reconciler;
use synch_yandex::YandexDisk;
use tokio::sync::broadcast;

use crate::error::{io_err, DaemonError};
use crate::log_rotation::RotationPolicy;
use crate::logging::init_tracing;
use crate::paths::log_file_path;
use crate::scheduler::{PassSummary, Scheduler};

/// Set up logging, then run the daemon on a fresh tokio runtime until it
/// is interrupted.
pub fn start_blocking(config: Config, home: &Path) -> Result<(), DaemonError> {
    let log_dir = config.log_dir_or_default(home);
    std::fs::create_dir_all(&log_dir).map_err(|e| io_err(&log_dir, e))?;

    // Rotate before the file layer holds the log open.
    let log_file = log_file_path(&log_dir);
    let rotated = RotationPolicy::default().apply(&log_file);
    init_tracing(config.log_format, Some(&log_file))?;
    match rotated {
        Ok(true) => tracing::info!(path = %log_file.display(), "log file rotated"),
        Ok(false) => {}
        Err(err) => tracing::warn!(path = %log_file.display(), error = %err, "log rotation failed"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the pass loop against Yandex Disk until a stop signal arrives.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    config.validate()?;
    tracing::info!(
        local = %config.path_local_folder.display(),
        cloud = %config.path_cloud_folder,
        interval_secs = config.synch_delay,
        "synch starting",
    );

    let remote = YandexDisk::new(&config);
    let remote = tokio::task::spawn_blocking(move || {
        if let Err(err) = remote.ensure_folder() {
            tracing::warn!(folder = %remote.remote_dir(), error = %err, "could not prepare the remote folder");
        }
        remote
    })
    .await
    .map_err(|err| DaemonError::Join {
        task: "ensure_folder",
        message: err.to_string(),
    })?;

    let reconciler = Reconciler::from_config(&config, remote);
    let scheduler = Scheduler::new(config.sync_interval());
    let stop = scheduler.stop_signal();

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);
    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            match wait_for_stop_signal().await {
                Ok(signal) => {
                    tracing::info!(signal, "received stop signal, shutting down");
                    let _ = shutdown.send(());
                }
                // Keep running; the process can still be killed.
                Err(err) => tracing::error!(error = %err, "signal handler failed"),
            }
        })
    };

    let passes = scheduler
        .run(
            move || {
                reconciler
                    .run_pass(&stop, false)
                    .map(|report| PassSummary::from(&report))
                    .map_err(DaemonError::from)
            },
            shutdown_rx,
        )
        .await?;

    signal_handle.abort();
    drop(shutdown_tx);
    tracing::info!(passes, "synch stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_stop_signal() -> Result<&'static str, DaemonError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).map_err(|e| io_err("SIGTERM handler", e))?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| io_err("ctrl-c handler", e))?;
            Ok("interrupt")
        }
        _ = terminate.recv() => Ok("terminate"),
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() -> Result<&'static str, DaemonError> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| io_err("ctrl-c handler", e))?;
    Ok("interrupt")
}
