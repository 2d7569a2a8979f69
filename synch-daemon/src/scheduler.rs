//! Pass scheduler: run a pass, sleep, repeat until told to stop.
//!
//! ```text
//! Idle -> Running -> Sleeping -> Running -> ... -> Stopped
//! ```
//!
//! A pass that fails is logged and the loop carries on. A stop that
//! arrives while sleeping ends the loop at once; a stop that arrives during
//! a pass raises the [`StopSignal`] so the pass skips its remaining actions,
//! and the loop ends once the pass returns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use synch_sync::{ActionKind, PassReport, StopSignal};
use tokio::sync::{broadcast, watch};

use crate::error::DaemonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Sleeping,
    Stopped,
}

/// Counts of what one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub uploaded: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u128,
}

impl From<&PassReport> for PassSummary {
    fn from(report: &PassReport) -> Self {
        Self {
            uploaded: report.done(ActionKind::Upload),
            replaced: report.done(ActionKind::Replace),
            deleted: report.done(ActionKind::Delete),
            unchanged: report.unchanged.len(),
            failed: report.failed(),
            skipped: report.skipped(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

pub struct Scheduler {
    interval: Duration,
    state: watch::Sender<SchedulerState>,
    stop: StopSignal,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            interval,
            state,
            stop: StopSignal::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// The flag raised when a stop arrives mid-pass; hand it to the pass.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Drive `pass` until `shutdown` fires (or its sender is dropped).
    ///
    /// Each pass runs on the blocking pool. Returns the number of passes
    /// started.
    pub async fn run<F>(
        &self,
        pass: F,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<usize, DaemonError>
    where
        F: Fn() -> Result<PassSummary, DaemonError> + Send + Sync + 'static,
    {
        let pass = Arc::new(pass);
        let mut passes = 0usize;

        loop {
            passes += 1;
            self.set(SchedulerState::Running);
            tracing::debug!(pass = passes, "pass started");

            let started = Instant::now();
            let job = Arc::clone(&pass);
            let mut handle = tokio::task::spawn_blocking(move || job());

            let mut stopping = false;
            let joined = tokio::select! {
                joined = &mut handle => joined,
                _ = shutdown.recv() => {
                    tracing::info!("stop requested, finishing the current pass");
                    self.stop.request();
                    stopping = true;
                    (&mut handle).await
                }
            };

            match joined {
                Ok(Ok(summary)) => tracing::debug!(
                    pass = passes,
                    uploaded = summary.uploaded,
                    replaced = summary.replaced,
                    deleted = summary.deleted,
                    failed = summary.failed,
                    "pass complete",
                ),
                Ok(Err(err)) => tracing::error!(pass = passes, error = %err, "pass failed"),
                Err(err) => {
                    let err = DaemonError::Join {
                        task: "pass",
                        message: err.to_string(),
                    };
                    tracing::error!(pass = passes, error = %err, "pass did not complete");
                }
            }
            tracing::debug!(
                pass = passes,
                elapsed_ms = started.elapsed().as_millis(),
                "pass finished"
            );

            if stopping {
                break;
            }

            self.set(SchedulerState::Sleeping);
            tracing::info!(seconds = self.interval.as_secs(), "waiting for the next pass");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("stop requested while idle");
                    break;
                }
            }
        }

        self.set(SchedulerState::Stopped);
        Ok(passes)
    }

    fn set(&self, state: SchedulerState) {
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use synch_sync::{RemoteError, SyncError};

    fn ok_pass() -> Result<PassSummary, DaemonError> {
        Ok(PassSummary::default())
    }

    async fn wait_for(rx: &mut watch::Receiver<SchedulerState>, wanted: SchedulerState) {
        while *rx.borrow_and_update() != wanted {
            rx.changed().await.expect("scheduler dropped");
        }
    }

    #[tokio::test]
    async fn starts_idle() {
        let scheduler = Scheduler::new(Duration::from_secs(30));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.interval(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn passes_are_separated_by_the_interval() {
        let interval = Duration::from_secs(30);
        let scheduler = Scheduler::new(interval);
        let (tx, rx) = broadcast::channel(4);

        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let started = tokio::time::Instant::now();
        let passes = scheduler
            .run(
                move || {
                    if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                        let _ = tx.send(());
                    }
                    ok_pass()
                },
                rx,
            )
            .await
            .unwrap();

        assert_eq!(passes, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= interval * 2, "two sleeps between three passes");
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_pass_is_retried_after_the_interval() {
        let interval = Duration::from_secs(30);
        let scheduler = Scheduler::new(interval);
        let (tx, rx) = broadcast::channel(4);
        let (ran_tx, mut ran_rx) = tokio::sync::mpsc::unbounded_channel();

        let count = Arc::new(AtomicUsize::new(0));
        let runner = tokio::spawn(async move {
            scheduler
                .run(
                    move || {
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        let _ = ran_tx.send(n);
                        match n {
                            0 => Err(DaemonError::Sync(SyncError::Listing(RemoteError::Transport(
                                "connection refused".into(),
                            )))),
                            _ => {
                                let _ = tx.send(());
                                ok_pass()
                            }
                        }
                    },
                    rx,
                )
                .await
        });

        // Pass start times, taken on the async side where the clock is paused.
        let mut seen = Vec::new();
        while let Some(n) = ran_rx.recv().await {
            seen.push((n, tokio::time::Instant::now()));
        }
        let passes = runner.await.unwrap().unwrap();

        assert_eq!(passes, 2);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].0, 1);
        assert!(
            seen[1].1 - seen[0].1 >= interval,
            "a failed pass waits out the full interval before the next one"
        );
    }

    #[tokio::test]
    async fn stop_while_sleeping_is_immediate() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_secs(3600)));
        let (tx, rx) = broadcast::channel(4);
        let mut states = scheduler.subscribe();

        let runner = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run(ok_pass, rx).await })
        };

        wait_for(&mut states, SchedulerState::Sleeping).await;
        let stop_sent = Instant::now();
        tx.send(()).unwrap();

        let passes = tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .expect("scheduler should stop without waiting out the interval")
            .unwrap()
            .unwrap();
        assert_eq!(passes, 1);
        assert!(stop_sent.elapsed() < Duration::from_secs(5));
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn stop_during_a_pass_raises_the_stop_signal() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_secs(3600)));
        let (tx, rx) = broadcast::channel(4);
        let mut states = scheduler.subscribe();
        let stop = scheduler.stop_signal();

        let runner = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                scheduler
                    .run(
                        move || {
                            // Simulates a pass that keeps issuing actions until told to stop.
                            while !stop.is_requested() {
                                std::thread::sleep(Duration::from_millis(5));
                            }
                            Ok(PassSummary {
                                skipped: 1,
                                ..PassSummary::default()
                            })
                        },
                        rx,
                    )
                    .await
            })
        };

        wait_for(&mut states, SchedulerState::Running).await;
        tx.send(()).unwrap();

        let passes = tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .expect("pass should wind down once stop is raised")
            .unwrap()
            .unwrap();
        assert_eq!(passes, 1);
        assert!(scheduler.stop_signal().is_requested());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn dropped_shutdown_sender_stops_the_loop() {
        let scheduler = Scheduler::new(Duration::from_secs(3600));
        let (tx, rx) = broadcast::channel::<()>(1);
        drop(tx);

        let passes = tokio::time::timeout(Duration::from_secs(5), scheduler.run(ok_pass, rx))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(passes, 1);
    }
}
