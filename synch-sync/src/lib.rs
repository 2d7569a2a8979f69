//! # synch-sync
//!
//! One-way reconciliation of a local folder into a remote folder.
//!
//! A pass lists the local folder ([`local::list_local`]) and the remote
//! folder ([`RemoteStore::list`]), decides what to do with [`plan::plan`],
//! then issues the actions through the [`RemoteStore`] in order: uploads and
//! replaces first, deletes last. [`Reconciler::run_pass`] ties it together.

pub mod error;
pub mod local;
pub mod plan;
pub mod reconcile;
pub mod remote;

pub use error::SyncError;
pub use plan::{plan, Action, ActionKind, Plan};
pub use reconcile::{ActionOutcome, PassReport, Reconciler, StopSignal};
pub use remote::{RemoteError, RemoteStore};
