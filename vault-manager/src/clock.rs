//! Tokio cycle clock: ticks `VaultManager::run_cycle` on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::manager::VaultManager;

/// Handle to a running cycle clock. Dropping it without `stop` leaves the
/// task running until the runtime shuts down.
pub struct CycleClock {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl CycleClock {
    /// Spawn the clock on the current tokio runtime.
    ///
    /// Each tick runs one cycle on the blocking pool. Ticks missed while a
    /// cycle is still running are skipped, never queued.
    pub fn start(manager: Arc<VaultManager>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let manager = Arc::clone(&manager);
                        match tokio::task::spawn_blocking(move || manager.run_cycle()).await {
                            Ok(Ok(report)) => {
                                ticks += 1;
                                tracing::debug!(
                                    cycle = report.cycle,
                                    transitions = report.transitions.len(),
                                    "cycle clock tick"
                                );
                            }
                            Ok(Err(e)) => {
                                tracing::error!(error = %e, "cycle failed");
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "cycle task panicked");
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!(ticks, "cycle clock stopped");
            ticks
        });

        tracing::info!(period_ms = period.as_millis() as u64, "cycle clock started");
        Self { shutdown_tx, handle }
    }

    /// Signal shutdown and wait for the in-flight cycle to finish.
    /// Returns the number of cycles the clock completed.
    pub async fn stop(self) -> u64 {
        let _ = self.shutdown_tx.send(true);
        match self.handle.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!(error = %e, "cycle clock task failed");
                0
            }
        }
    }
}
