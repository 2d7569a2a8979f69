pub mod once;
pub mod plan;
pub mod run;

use anyhow::{Context, Result};
use synch_core::Config;
use synch_sync::Reconciler;
use synch_yandex::YandexDisk;

/// Stderr logging plus a reconciler wired to Yandex Disk, for the one-shot commands.
pub(crate) fn one_shot_reconciler(config: &Config) -> Result<Reconciler<YandexDisk>> {
    synch_daemon::init_tracing(config.log_format, None).context("failed to set up logging")?;
    Ok(Reconciler::from_config(config, YandexDisk::new(config)))
}
