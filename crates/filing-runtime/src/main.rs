//! # Tax Filing Runtime
//!
//! Runs the submission pipeline as a long-lived service: the poll scheduler
//! sweeps outstanding declarations and accepted ones get their receipts
//! validated and stored.
//!
//! ## Usage
//!
//! ```text
//! filing-runtime                          # sweep only
//! filing-runtime file vat-ledger 2024-03  # file one declaration, then keep sweeping
//! ```
//!
//! Configuration comes from `TF_*` environment variables (see `FilingConfig`).
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load and validate configuration (production rules when `TF_ENVIRONMENT=production`)
//! 3. Build the container in dependency order
//! 4. Start handlers and the scheduler
//! 5. Optionally file the requested declaration

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use filing_runtime::adapters::JsonTotalsSource;
use filing_runtime::{FilingConfig, FilingContainer, FilingRuntime};
use filing_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::{DeclarationType, ReportingPeriod};

/// `file <declaration-type> <period>` from the command line.
fn requested_filing() -> Result<Option<(DeclarationType, ReportingPeriod)>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(None),
        [command, declaration_type, period] if command == "file" => {
            let declaration_type = declaration_type
                .parse::<DeclarationType>()
                .with_context(|| format!("invalid declaration type {declaration_type:?}"))?;
            let period = period
                .parse::<ReportingPeriod>()
                .with_context(|| format!("invalid reporting period {period:?}"))?;
            Ok(Some((declaration_type, period)))
        }
        _ => bail!("usage: filing-runtime [file <vat-ledger|vat-return> <YYYY-MM|YYYY-Qn>]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let filing = requested_filing()?;
    let config = FilingConfig::from_env().context("Failed to load configuration")?;
    let totals = Arc::new(JsonTotalsSource::new(config.totals_dir.clone()));

    let container = FilingContainer::from_config(config).context("Failed to build filing container")?;
    let runtime = FilingRuntime::new(container, totals);
    runtime.start().await;

    if let Some((declaration_type, period)) = filing {
        match runtime.file(declaration_type, period).await {
            Ok(declaration) => info!(
                declaration_id = %declaration.id,
                status = %declaration.status,
                confirmation_number = declaration.confirmation_number.as_deref().unwrap_or("-"),
                "Declaration filed"
            ),
            Err(e) => error!(
                declaration_id = ?e.declaration_id(),
                error = %e,
                "Filing failed"
            ),
        }
    }

    info!("Filing runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
