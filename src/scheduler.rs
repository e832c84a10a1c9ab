//! Periodic tick driver
//!
//! A [`PeriodicTask`] runs an async tick body on a fixed interval, one tick
//! at a time. Stopping only prevents further ticks: a tick that is already
//! running always completes.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{Result, SenseError};

/// Handle to a spawned periodic loop
///
/// Dropping the handle also stops the loop after the current tick.
pub struct PeriodicTask {
    name: String,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl PeriodicTask {
    /// Spawn a loop calling `tick(n)` every `period`, first call immediately
    ///
    /// The loop ends when `tick` returns `ControlFlow::Break`, or after
    /// [`stop`](Self::stop). Ticks that fall behind are delayed, not
    /// bunched up.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, mut tick: F) -> Self
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            log::info!("{} started, period {:?}", task_name, period);

            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                    _ = interval.tick() => {}
                }

                let flow = tick(ticks).await;
                ticks += 1;
                if flow.is_break() {
                    break;
                }
            }

            log::info!("{} stopped after {} ticks", task_name, ticks);
            ticks
        });

        Self {
            name,
            stop_tx,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the loop has already exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop scheduling ticks and wait for the loop to exit
    ///
    /// Returns the number of ticks that ran.
    pub async fn stop(self) -> Result<u64> {
        // The loop may have exited on its own already.
        let _ = self.stop_tx.send(true);
        self.join_inner().await
    }

    /// Wait for the tick body to end the loop
    pub async fn join(self) -> Result<u64> {
        self.join_inner().await
    }

    async fn join_inner(self) -> Result<u64> {
        let Self { name, stop_tx, handle } = self;
        let result = handle.await.map_err(|e| SenseError::Scheduler {
            reason: format!("{} did not shut down cleanly: {}", name, e),
        });
        drop(stop_tx);
        result
    }
}
