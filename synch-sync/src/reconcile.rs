//! Reconciler: runs one pass: list both sides, plan, apply.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use synch_core::{Config, FileName, Snapshot};

use crate::error::SyncError;
use crate::local;
use crate::plan::{self, Action, ActionKind, Plan};
use crate::remote::{RemoteError, RemoteStore};

// ---------------------------------------------------------------------------
// Stop signal
// ---------------------------------------------------------------------------

/// Cooperative stop flag shared between the scheduler and a running pass.
///
/// Checked before every remote action; once raised, the remaining actions of
/// the pass are reported as [`ActionOutcome::Skipped`].
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a single planned action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The remote call succeeded.
    Applied(Action),
    /// Dry run: the action would have been issued.
    WouldApply(Action),
    /// The remote call failed; the pass carried on with the next file.
    Failed { action: Action, error: RemoteError },
    /// Not attempted because a stop was requested mid-pass.
    Skipped(Action),
}

impl ActionOutcome {
    pub fn action(&self) -> &Action {
        match self {
            ActionOutcome::Applied(action)
            | ActionOutcome::WouldApply(action)
            | ActionOutcome::Skipped(action)
            | ActionOutcome::Failed { action, .. } => action,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }
}

/// Everything one pass observed and did.
#[derive(Debug)]
pub struct PassReport {
    pub local_files: usize,
    pub remote_files: usize,
    pub unchanged: Vec<FileName>,
    pub outcomes: Vec<ActionOutcome>,
    pub duration: Duration,
}

impl PassReport {
    /// Successful (or, in a dry run, planned) actions of `kind`.
    pub fn done(&self, kind: ActionKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(o, ActionOutcome::Applied(_) | ActionOutcome::WouldApply(_))
                    && o.action().kind() == kind
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ActionOutcome::Skipped(_)))
            .count()
    }

    /// The actions that were issued or planned, in order.
    pub fn actions(&self) -> Vec<&Action> {
        self.outcomes.iter().map(ActionOutcome::action).collect()
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Reconciles one local folder into the remote folder behind `R`.
///
/// Holds no state between passes; every pass starts from fresh snapshots.
pub struct Reconciler<R> {
    local_dir: PathBuf,
    remote: R,
}

impl<R: RemoteStore> Reconciler<R> {
    pub fn new(local_dir: impl Into<PathBuf>, remote: R) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote,
        }
    }

    pub fn from_config(config: &Config, remote: R) -> Self {
        Self::new(config.path_local_folder.clone(), remote)
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Take both snapshots and compute the plan without issuing anything.
    ///
    /// Aborts with [`SyncError::LocalIo`] or [`SyncError::Listing`].
    pub fn snapshot_and_plan(&self) -> Result<(Snapshot, Snapshot, Plan), SyncError> {
        let local = local::list_local(&self.local_dir)?;
        tracing::info!(
            count = local.len(),
            files = ?local.names(),
            "local files to synchronise",
        );

        let remote = match self.remote.list() {
            Ok(records) => Snapshot::from_records(records),
            Err(err) => {
                tracing::error!(error = %err, "remote listing not received, aborting pass");
                return Err(SyncError::Listing(err));
            }
        };
        tracing::info!(
            count = remote.len(),
            files = ?remote.names(),
            "files present in the cloud",
        );

        let plan = plan::plan(&local, &remote);
        Ok((local, remote, plan))
    }

    /// Run one full pass.
    ///
    /// With `dry_run` the plan is reported as [`ActionOutcome::WouldApply`]
    /// and no remote call besides the listing is made.
    pub fn run_pass(&self, stop: &StopSignal, dry_run: bool) -> Result<PassReport, SyncError> {
        let started = Instant::now();
        let (local, remote, plan) = self.snapshot_and_plan()?;

        let outcomes = if dry_run {
            plan.actions
                .iter()
                .cloned()
                .map(|action| {
                    tracing::info!(action = %action, "[dry-run] would issue");
                    ActionOutcome::WouldApply(action)
                })
                .collect()
        } else {
            self.apply(&plan, stop)
        };

        let report = PassReport {
            local_files: local.len(),
            remote_files: remote.len(),
            unchanged: plan.unchanged,
            outcomes,
            duration: started.elapsed(),
        };
        tracing::info!(
            uploaded = report.done(ActionKind::Upload),
            replaced = report.done(ActionKind::Replace),
            deleted = report.done(ActionKind::Delete),
            unchanged = report.unchanged.len(),
            failed = report.failed(),
            skipped = report.skipped(),
            "synchronisation finished",
        );
        Ok(report)
    }

    /// Issue every action of `plan` in order, one at a time.
    ///
    /// A failed action is logged and the next one is attempted; nothing is
    /// retried within the pass.
    pub fn apply(&self, plan: &Plan, stop: &StopSignal) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(plan.actions.len());
        for action in &plan.actions {
            if stop.is_requested() {
                tracing::debug!(action = %action, "stop requested, skipping");
                outcomes.push(ActionOutcome::Skipped(action.clone()));
                continue;
            }
            outcomes.push(self.issue(action));
        }
        outcomes
    }

    fn issue(&self, action: &Action) -> ActionOutcome {
        let result = match action {
            Action::Upload(name) => {
                tracing::info!(file = %name, "uploading file to the cloud");
                self.remote.upload(name)
            }
            Action::Replace(name) => {
                tracing::info!(file = %name, "updating file in the cloud");
                self.remote.replace(name)
            }
            Action::Delete(name) => {
                tracing::info!(file = %name, "deleting file from the cloud");
                self.remote.delete(name)
            }
        };

        match result {
            Ok(()) => ActionOutcome::Applied(action.clone()),
            Err(error) => {
                if error.is_conflict() {
                    tracing::warn!(action = %action, error = %error, "remote reported a conflict");
                } else {
                    tracing::error!(action = %action, error = %error, "remote action failed");
                }
                ActionOutcome::Failed {
                    action: action.clone(),
                    error,
                }
            }
        }
    }
}
