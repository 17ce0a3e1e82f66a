//! Background expiry sweep.
//!
//! Periodically drives the orchestrator's expiry pass so overdue
//! approvals reach EXPIRED even when nobody reads them. Lazy expiry on
//! the gate's read paths covers the gap between sweeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::orchestrator::Orchestrator;

/// Background loop expiring overdue approval requests.
pub struct ExpirySweeper {
    orchestrator: Arc<Orchestrator>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl ExpirySweeper {
    pub fn new(orchestrator: Arc<Orchestrator>, interval_secs: u64) -> Self {
        Self {
            orchestrator,
            interval: Duration::from_secs(interval_secs.max(1)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run sweep passes until shutdown is signalled. A pass runs
    /// immediately on start, then every interval.
    pub async fn run(&self) {
        loop {
            let expired = self.orchestrator.sweep_expired();
            if expired > 0 {
                tracing::info!(expired, "Expiry sweep finalized overdue approvals");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.notified() => return,
            }
        }
    }

    /// Signal the sweeper to shut down gracefully.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
