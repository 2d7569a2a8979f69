//! synch: keep a Yandex Disk folder an exact copy of a local folder.
//!
//! # Usage
//!
//! ```text
//! synch [--config <path>] [run]     # reconcile every `synch_delay` seconds until interrupted
//! synch [--config <path>] once [--dry-run]
//! synch [--config <path>] plan [--json]
//! ```
//!
//! Without `--config`, `synch.yaml` is looked up in the working directory and
//! its parents, then in the user configuration directory.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{once::OnceArgs, plan::PlanArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "synch",
    version,
    about = "Mirror a local folder into a Yandex Disk folder",
    long_about = None,
)]
struct Cli {
    /// Configuration file to use instead of discovering `synch.yaml`.
    #[arg(long, global = true, env = "SYNCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run reconciliation passes until interrupted (the default).
    Run,

    /// Run a single pass and print what was done.
    Once(OnceArgs),

    /// Show the actions the next pass would issue, without issuing them.
    Plan(PlanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = synch_core::config::resolve(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config),
        Commands::Once(args) => args.run(config),
        Commands::Plan(args) => args.run(config),
    }
}
