//! `synch plan`: what the next pass would do.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use synch_core::{Config, FileName, Snapshot};
use synch_sync::{Action, ActionKind, Plan};

/// Arguments for `synch plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self, config: Config) -> Result<()> {
        let reconciler = super::one_shot_reconciler(&config)?;
        let (local, remote, plan) = reconciler
            .snapshot_and_plan()
            .context("could not list both folders")?;

        if self.json {
            print_json(&plan)
        } else {
            print_table(&config, &local, &remote, &plan);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct PlanJson<'a> {
    summary: PlanSummaryJson,
    actions: &'a [Action],
    unchanged: &'a [FileName],
}

#[derive(Serialize)]
struct PlanSummaryJson {
    upload: usize,
    replace: usize,
    delete: usize,
    unchanged: usize,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "local modified")]
    local: String,
    #[tabled(rename = "cloud modified")]
    remote: String,
}

fn print_json(plan: &Plan) -> Result<()> {
    let payload = PlanJson {
        summary: PlanSummaryJson {
            upload: plan.count(ActionKind::Upload),
            replace: plan.count(ActionKind::Replace),
            delete: plan.count(ActionKind::Delete),
            unchanged: plan.unchanged.len(),
        },
        actions: &plan.actions,
        unchanged: &plan.unchanged,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_table(config: &Config, local: &Snapshot, remote: &Snapshot, plan: &Plan) {
    println!(
        "{} → {} | {} to upload | {} to replace | {} to delete | {} unchanged",
        config.path_local_folder.display(),
        config.path_cloud_folder,
        plan.count(ActionKind::Upload),
        plan.count(ActionKind::Replace),
        plan.count(ActionKind::Delete),
        plan.unchanged.len(),
    );
    if plan.is_empty() {
        println!("{}", "Cloud folder is up to date.".green());
        return;
    }

    let modified = |snapshot: &Snapshot, name: &FileName| {
        snapshot
            .get(name)
            .map(|record| record.modified_iso8601())
            .unwrap_or_else(|| "-".to_string())
    };
    let rows: Vec<PlanTableRow> = plan
        .actions
        .iter()
        .map(|action| PlanTableRow {
            action: label(action.kind()),
            file: action.name().to_string(),
            local: modified(local, action.name()),
            remote: modified(remote, action.name()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn label(kind: ActionKind) -> String {
    let text = kind.to_string().to_uppercase();
    match kind {
        ActionKind::Upload => text.green().to_string(),
        ActionKind::Replace => text.yellow().to_string(),
        ActionKind::Delete => text.red().to_string(),
    }
}
