//! # Poll Scheduler
//!
//! One periodic task drives every asynchronous follow-up: status polls for
//! submitted declarations and due retries. Missed ticks are skipped rather
//! than bunched up.

use filing_telemetry::DECLARATIONS_AWAITING;
use std::sync::Arc;
use std::time::Duration;
use tf_06_status_tracker::{Clock, DeclarationRepository, StatusTrackerApi, SweepReport};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct PollScheduler {
    tracker: Arc<dyn StatusTrackerApi>,
    repository: Arc<dyn DeclarationRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(
        tracker: Arc<dyn StatusTrackerApi>,
        repository: Arc<dyn DeclarationRepository>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            tracker,
            repository,
            clock,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one sweep now.
    pub async fn tick(&self) -> SweepReport {
        let report = self.tracker.sweep(self.clock.now()).await;
        let awaiting = self.repository.awaiting_outcome().len();
        DECLARATIONS_AWAITING.set(awaiting as f64);

        if report.examined > 0 {
            info!(
                examined = report.examined,
                polled = report.polled,
                resubmitted = report.resubmitted,
                skipped_locked = report.skipped_locked,
                errors = report.errors,
                awaiting,
                "Sweep finished"
            );
        } else {
            debug!("Sweep found nothing to do");
        }
        report
    }

    /// Sweep on every interval until `shutdown` flips. The first sweep runs
    /// immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Poll scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Poll scheduler stopped");
                        break;
                    }
                }
            }
        }
    }
}
