//! Prometheus metrics for the filing pipeline.
//!
//! All metrics follow the naming convention: `tf_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., documents_rendered_total)
//! - **Gauge**: Value that can go up or down (e.g., declarations_awaiting)
//! - **Histogram**: Distribution of values (e.g., transport_call_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // RENDERING / VALIDATION / SIGNING
    // =========================================================================

    pub static ref DOCUMENTS_RENDERED: CounterVec = CounterVec::new(
        Opts::new("tf_renderer_documents_rendered_total", "Documents rendered"),
        &["form_code"]
    ).expect("metric creation failed");

    pub static ref VALIDATION_FAILURES: CounterVec = CounterVec::new(
        Opts::new("tf_validator_failures_total", "Documents that failed validation"),
        &["pass"]  // pass: structural/schema/business
    ).expect("metric creation failed");

    pub static ref SIGNATURES_CREATED: CounterVec = CounterVec::new(
        Opts::new("tf_signature_created_total", "Signatures embedded into documents"),
        &["signature_type"]
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    pub static ref SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("tf_transport_submissions_total", "Submission attempts"),
        &["outcome"]  // outcome: accepted/failed
    ).expect("metric creation failed");

    /// Transport errors by classified category (for alerting)
    pub static ref TRANSPORT_ERRORS: CounterVec = CounterVec::new(
        Opts::new("tf_transport_errors_total", "Transport errors by category"),
        &["category"]
    ).expect("metric creation failed");

    pub static ref TRANSPORT_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "tf_transport_call_duration_seconds",
            "Time spent in authority calls"
        ).buckets(exponential_buckets(0.01, 2.0, 12).unwrap_or_default()),
        &["operation"]  // operation: submit/check_status/probe
    ).expect("metric creation failed");

    // =========================================================================
    // STATUS TRACKER
    // =========================================================================

    pub static ref RETRIES_SCHEDULED: Counter = Counter::new(
        "tf_tracker_retries_scheduled_total",
        "Retryable failures that scheduled another attempt"
    ).expect("metric creation failed");

    pub static ref STATUS_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("tf_tracker_transitions_total", "Committed status transitions"),
        &["to"]
    ).expect("metric creation failed");

    /// Declarations in submitted/processing at the end of the last sweep
    pub static ref DECLARATIONS_AWAITING: Gauge = Gauge::new(
        "tf_tracker_declarations_awaiting",
        "Declarations awaiting an authority outcome"
    ).expect("metric creation failed");

    // =========================================================================
    // CONFIRMATION
    // =========================================================================

    pub static ref CONFIRMATIONS_STORED: Counter = Counter::new(
        "tf_confirmation_stored_total",
        "Receipts validated and stored"
    ).expect("metric creation failed");

    pub static ref DUPLICATE_CONFIRMATIONS: Counter = Counter::new(
        "tf_confirmation_duplicates_total",
        "Receipts whose confirmation number was already on file"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    pub static ref COMPONENT_ERRORS: CounterVec = CounterVec::new(
        Opts::new("tf_component_errors_total", "Errors by component and type"),
        &["component", "error_type"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DOCUMENTS_RENDERED.clone()),
        Box::new(VALIDATION_FAILURES.clone()),
        Box::new(SIGNATURES_CREATED.clone()),
        Box::new(SUBMISSIONS.clone()),
        Box::new(TRANSPORT_ERRORS.clone()),
        Box::new(TRANSPORT_DURATION.clone()),
        Box::new(RETRIES_SCHEDULED.clone()),
        Box::new(STATUS_TRANSITIONS.clone()),
        Box::new(DECLARATIONS_AWAITING.clone()),
        Box::new(CONFIRMATIONS_STORED.clone()),
        Box::new(DUPLICATE_CONFIRMATIONS.clone()),
        Box::new(COMPONENT_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
