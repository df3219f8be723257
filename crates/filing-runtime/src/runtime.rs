//! # Filing Runtime
//!
//! Starts the background tasks around a [`FilingContainer`] and stops them
//! on a shared shutdown signal.
//!
//! ## Startup Sequence
//!
//! 1. Probe the authority endpoint (failure is logged, not fatal)
//! 2. Start the metrics and confirmation handlers
//! 3. Start the poll scheduler

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use shared_types::{Declaration, DeclarationType, ReportingPeriod};

use crate::container::FilingContainer;
use crate::ports::TotalsSource;
use crate::wiring::{FilingPipeline, FilingRequest, PipelineError};

/// How long `shutdown` waits for background tasks to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct FilingRuntime {
    container: Arc<FilingContainer>,
    pipeline: FilingPipeline,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FilingRuntime {
    pub fn new(container: FilingContainer, totals: Arc<dyn TotalsSource>) -> Self {
        let pipeline = container.pipeline(totals);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            pipeline,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub async fn start(&self) {
        info!(
            endpoint = %self.container.config.authority.endpoint,
            signature_type = %self.container.config.signing.signature_type,
            "Starting filing runtime"
        );

        match self.container.transport.probe_connectivity().await {
            Ok(()) => info!("Authority endpoint reachable"),
            Err(e) => warn!(error = %e, "Authority endpoint not reachable; sweeps will retry"),
        }

        let mut tasks = self.tasks.lock();

        let (metrics, subscription) = self.container.metrics_handler();
        let mut shutdown = self.shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = metrics.run(subscription) => {}
                _ = shutdown.changed() => {
                    info!("[metrics] Shutdown signal received");
                }
            }
        }));

        let (confirmation, subscription) = self.container.confirmation_handler();
        let mut shutdown = self.shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = confirmation.run(subscription) => {}
                _ = shutdown.changed() => {
                    info!("[confirmation] Shutdown signal received");
                }
            }
        }));

        let scheduler = self.container.scheduler();
        tasks.push(tokio::spawn(scheduler.run(self.shutdown_rx.clone())));

        info!(
            sweep_interval_secs = self.container.config.scheduler.sweep_interval.as_secs(),
            "Filing runtime running"
        );
    }

    /// Prepare, sign and submit one declaration with the configured strategy.
    pub async fn file(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
    ) -> Result<Declaration, PipelineError> {
        let request = FilingRequest::new(declaration_type, period, self.container.signature_config());
        self.pipeline.file(&request).await
    }

    pub fn pipeline(&self) -> &FilingPipeline {
        &self.pipeline
    }

    /// Signal every task, then wait up to a short grace period for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Background task ended abnormally"),
                Err(_) => warn!("Background task did not stop in time"),
            }
        }

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<FilingContainer> {
        Arc::clone(&self.container)
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}
