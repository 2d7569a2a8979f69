//! `synch run`: the long-running pass loop.

use anyhow::{Context, Result};
use synch_core::Config;

pub fn run(config: Config) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    synch_daemon::start_blocking(config, &home).context("synch daemon failed")
}
