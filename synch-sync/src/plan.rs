//! Pure decision logic: two snapshots in, an ordered list of actions out.
//!
//! ## Algorithm
//!
//! 1. Index the remote snapshot by name.
//! 2. Walk the local snapshot in listing order. A name missing from the
//!    index is an upload. A name present is removed from the index and is a
//!    replace only when the local copy is strictly newer ("newer wins");
//!    equal or older is a no-op.
//! 3. Whatever is left in the index has no local counterpart and is
//!    deleted, in remote listing order.
//!
//! Uploads and replaces always precede deletes in the resulting plan.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use synch_core::{FileName, FileRecord, Snapshot};

/// What to do with one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", content = "name", rename_all = "lowercase")]
pub enum Action {
    /// Present locally only.
    Upload(FileName),
    /// Present on both sides, local copy strictly newer.
    Replace(FileName),
    /// Present remotely only.
    Delete(FileName),
}

/// Discriminant of [`Action`], handy for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Upload,
    Replace,
    Delete,
}

impl Action {
    pub fn name(&self) -> &FileName {
        match self {
            Action::Upload(name) | Action::Replace(name) | Action::Delete(name) => name,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Upload(_) => ActionKind::Upload,
            Action::Replace(_) => ActionKind::Replace,
            Action::Delete(_) => ActionKind::Delete,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Upload => write!(f, "upload"),
            ActionKind::Replace => write!(f, "replace"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// The reconciling actions for one pass plus the files that needed nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub unchanged: Vec<FileName>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }
}

/// `true` when the local copy should overwrite the remote one.
///
/// Timestamps are compared as instants, so differing offsets are fine.
pub fn local_is_newer(local: &FileRecord, remote: &FileRecord) -> bool {
    local.modified_at > remote.modified_at
}

/// Compute the reconciling actions for `local` against `remote`.
pub fn plan(local: &Snapshot, remote: &Snapshot) -> Plan {
    let mut unmatched: HashMap<&FileName, &FileRecord> =
        remote.iter().map(|r| (&r.name, r)).collect();

    let mut plan = Plan::default();
    for file in local {
        match unmatched.remove(&file.name) {
            None => plan.actions.push(Action::Upload(file.name.clone())),
            Some(remote_file) if local_is_newer(file, remote_file) => {
                plan.actions.push(Action::Replace(file.name.clone()));
            }
            Some(_) => plan.unchanged.push(file.name.clone()),
        }
    }

    // Iterate the snapshot, not the map, to keep remote listing order.
    for remote_file in remote {
        if unmatched.contains_key(&remote_file.name) {
            plan.actions.push(Action::Delete(remote_file.name.clone()));
        }
    }

    plan
}
