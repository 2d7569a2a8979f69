//! Long-running side of synch: the pass scheduler, log setup and the
//! process runtime that wires the Yandex client into the reconciler.

mod error;
pub mod log_rotation;
pub mod logging;
pub mod paths;
mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use logging::init_tracing;
pub use runtime::{run, start_blocking};
pub use scheduler::{PassSummary, Scheduler, SchedulerState};
