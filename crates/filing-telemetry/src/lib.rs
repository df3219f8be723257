//! # Filing Telemetry
//!
//! Logging and metrics for the filing pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use filing_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TF_SERVICE_NAME` | `tax-filing` | Service name in logs |
//! | `TF_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `TF_JSON_LOGS` | `false` | JSON output (defaults on inside containers) |
//! | `TF_METRICS_ENABLED` | `true` | Register Prometheus metrics |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, COMPONENT_ERRORS, CONFIRMATIONS_STORED,
    DECLARATIONS_AWAITING, DOCUMENTS_RENDERED, DUPLICATE_CONFIRMATIONS, RETRIES_SCHEDULED,
    SIGNATURES_CREATED, STATUS_TRANSITIONS, SUBMISSIONS, TRANSPORT_DURATION, TRANSPORT_ERRORS,
    VALIDATION_FAILURES,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging, then metrics when enabled.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)?;
    if config.metrics_enabled {
        register_metrics()?;
    }
    Ok(())
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for recording a metric with a value.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}
