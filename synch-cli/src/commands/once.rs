//! `synch once`: a single reconciliation pass.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use synch_core::Config;
use synch_sync::{Action, ActionOutcome, PassReport, StopSignal};

/// Arguments for `synch once`.
#[derive(Args, Debug)]
pub struct OnceArgs {
    /// List both folders and report the actions without issuing them.
    #[arg(long)]
    pub dry_run: bool,
}

impl OnceArgs {
    pub fn run(self, config: Config) -> Result<()> {
        let reconciler = super::one_shot_reconciler(&config)?;
        let report = reconciler
            .run_pass(&StopSignal::new(), self.dry_run)
            .context("pass aborted")?;

        print_report(&report, self.dry_run);
        let failed = report.failed();
        if failed > 0 {
            bail!("{failed} action(s) failed");
        }
        Ok(())
    }
}

fn print_report(report: &PassReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.outcomes.is_empty() {
        println!(
            "{prefix}✓ nothing to do ({} local, {} in the cloud)",
            report.local_files, report.remote_files
        );
        return;
    }

    println!(
        "{prefix}✓ pass finished in {} ms ({} actions, {} unchanged, {} failed)",
        report.duration.as_millis(),
        report.outcomes.len(),
        report.unchanged.len(),
        report.failed(),
    );
    for outcome in &report.outcomes {
        match outcome {
            ActionOutcome::Applied(action) => println!("  {}  {}", glyph(action), action.name()),
            ActionOutcome::WouldApply(action) => println!("  ~  {action}"),
            ActionOutcome::Skipped(action) => println!("  ·  {action} (skipped)"),
            ActionOutcome::Failed { action, error } => {
                println!("  {}  {action}: {error}", "✗".red())
            }
        }
    }
}

fn glyph(action: &Action) -> colored::ColoredString {
    match action {
        Action::Upload(_) => "+".green(),
        Action::Replace(_) => "✎".yellow(),
        Action::Delete(_) => "-".red(),
    }
}
