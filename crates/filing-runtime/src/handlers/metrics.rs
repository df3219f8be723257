//! # Metrics Handler
//!
//! Turns bus events into Prometheus counters. Rendering and validation
//! counters are recorded by the pipeline itself; everything downstream of
//! submission is counted here.

use filing_telemetry::{
    metric_inc, COMPONENT_ERRORS, CONFIRMATIONS_STORED, DUPLICATE_CONFIRMATIONS, RETRIES_SCHEDULED,
    SIGNATURES_CREATED, STATUS_TRANSITIONS, TRANSPORT_ERRORS,
};
use shared_bus::{component_ids, FilingEvent, Subscription};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct MetricsHandler;

impl MetricsHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(self, mut subscription: Subscription) {
        info!("Metrics handler started");
        while let Some(event) = subscription.recv().await {
            self.record(&event);
        }
        debug!("Event bus closed, metrics handler exiting");
    }

    pub fn record(&self, event: &FilingEvent) {
        match event {
            FilingEvent::DocumentSigned { signature_type, .. } => {
                metric_inc!(SIGNATURES_CREATED, &[signature_type.as_str()]);
            }
            FilingEvent::StatusChanged { to, .. } => {
                metric_inc!(STATUS_TRANSITIONS, &[to.as_str()]);
            }
            FilingEvent::RetryScheduled { category, .. } => {
                metric_inc!(RETRIES_SCHEDULED);
                metric_inc!(TRANSPORT_ERRORS, &[category.as_str()]);
            }
            FilingEvent::ConfirmationStored { duplicate, .. } => {
                if *duplicate {
                    metric_inc!(DUPLICATE_CONFIRMATIONS);
                } else {
                    metric_inc!(CONFIRMATIONS_STORED);
                }
            }
            FilingEvent::ConfirmationInvalid { .. } => {
                metric_inc!(COMPONENT_ERRORS, &["confirmation", "invalid-receipt"]);
            }
            FilingEvent::CriticalError {
                component_id,
                error_type,
                ..
            } => {
                // Terminal tracker failures carry the classified category.
                if *component_id == component_ids::STATUS_TRACKER {
                    metric_inc!(TRANSPORT_ERRORS, &[error_type.as_str()]);
                }
                metric_inc!(COMPONENT_ERRORS, &[component_name(*component_id), error_type.as_str()]);
            }
            FilingEvent::DocumentRendered { .. }
            | FilingEvent::DeclarationReady { .. }
            | FilingEvent::OutcomeAccepted { .. } => {}
        }
    }
}

fn component_name(id: u8) -> &'static str {
    match id {
        component_ids::RENDERER => "renderer",
        component_ids::VALIDATOR => "validator",
        component_ids::SIGNATURE => "signature",
        component_ids::TRANSPORT => "transport",
        component_ids::ERROR_CLASSIFIER => "error-classifier",
        component_ids::STATUS_TRACKER => "status-tracker",
        component_ids::CONFIRMATION => "confirmation",
        _ => "runtime",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_types::{DeclarationId, DeclarationStatus, SignatureType, TransitionTrigger};

    #[test]
    fn test_events_move_counters() {
        let handler = MetricsHandler::new();
        let id = DeclarationId::new();
        let retries = RETRIES_SCHEDULED.get();
        let duplicates = DUPLICATE_CONFIRMATIONS.get();
        let rejected = STATUS_TRANSITIONS.with_label_values(&["rejected"]).get();

        handler.record(&FilingEvent::RetryScheduled {
            declaration_id: id,
            attempt: 1,
            category: "timeout".into(),
            next_retry_at: Utc::now(),
        });
        handler.record(&FilingEvent::StatusChanged {
            declaration_id: id,
            from: DeclarationStatus::Submitted,
            to: DeclarationStatus::Rejected,
            trigger: TransitionTrigger::Sweep,
            reason: "authority rejected".into(),
        });
        handler.record(&FilingEvent::ConfirmationStored {
            declaration_id: id,
            confirmation_number: "N".into(),
            duplicate: true,
        });
        handler.record(&FilingEvent::DocumentSigned {
            declaration_id: id,
            signature_id: "sig-1".into(),
            signature_type: SignatureType::LocalCertificate,
        });

        assert!(RETRIES_SCHEDULED.get() >= retries + 1.0);
        assert!(TRANSPORT_ERRORS.with_label_values(&["timeout"]).get() >= 1.0);
        assert!(DUPLICATE_CONFIRMATIONS.get() >= duplicates + 1.0);
        assert!(STATUS_TRANSITIONS.with_label_values(&["rejected"]).get() >= rejected + 1.0);
        assert!(SIGNATURES_CREATED.with_label_values(&["local-certificate"]).get() >= 1.0);
    }

    #[test]
    fn test_critical_errors_are_labelled_by_component() {
        let handler = MetricsHandler::new();
        handler.record(&FilingEvent::CriticalError {
            component_id: component_ids::STATUS_TRACKER,
            declaration_id: None,
            error_type: "authentication".into(),
            message: "401".into(),
        });
        assert!(
            COMPONENT_ERRORS
                .with_label_values(&["status-tracker", "authentication"])
                .get()
                >= 1.0
        );
        assert!(TRANSPORT_ERRORS.with_label_values(&["authentication"]).get() >= 1.0);
        assert_eq!(component_name(42), "runtime");
    }
}
