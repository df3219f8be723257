//! # Confirmation Handler
//!
//! Reacts to `OutcomeAccepted`: fetches the receipt if the event did not
//! carry one, validates it against the declaration and stores it.
//!
//! ## Flow
//!
//! 1. Status tracker commits `accepted` → publishes `OutcomeAccepted`
//! 2. Handler loads the declaration and builds the expected values
//! 3. Receipt validated and stored → publishes `ConfirmationStored`
//! 4. Receipt rejected → publishes `ConfirmationInvalid`

use filing_telemetry::{log_declaration_event, metric_inc, COMPONENT_ERRORS};
use shared_bus::{component_ids, EventPublisher, FilingEvent, Subscription};
use shared_types::DeclarationId;
use std::sync::Arc;
use tf_04_transport::FilingTransport;
use tf_06_status_tracker::StatusTrackerApi;
use tf_07_confirmation::{ConfirmationValidatorApi, ExpectedDeclaration};
use tracing::{info, warn};

pub struct ConfirmationHandler {
    tracker: Arc<dyn StatusTrackerApi>,
    transport: Arc<dyn FilingTransport>,
    validator: Arc<dyn ConfirmationValidatorApi>,
    publisher: Arc<dyn EventPublisher>,
}

impl ConfirmationHandler {
    pub fn new(
        tracker: Arc<dyn StatusTrackerApi>,
        transport: Arc<dyn FilingTransport>,
        validator: Arc<dyn ConfirmationValidatorApi>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            tracker,
            transport,
            validator,
            publisher,
        }
    }

    /// Handle events until the bus closes.
    pub async fn run(self, mut subscription: Subscription) {
        info!("Confirmation handler started");
        while let Some(event) = subscription.recv().await {
            self.handle(&event).await;
        }
        info!("Event bus closed, confirmation handler exiting");
    }

    /// Process one event; anything but `OutcomeAccepted` is ignored.
    pub async fn handle(&self, event: &FilingEvent) {
        let FilingEvent::OutcomeAccepted {
            declaration_id,
            confirmation_number,
            receipt,
        } = event
        else {
            return;
        };

        let receipt = match receipt {
            Some(receipt) => receipt.clone(),
            None => match self.fetch_receipt(*declaration_id, confirmation_number).await {
                Some(receipt) => receipt,
                None => return,
            },
        };

        let declaration = match self.tracker.get(*declaration_id).await {
            Ok(declaration) => declaration,
            Err(e) => {
                self.critical(*declaration_id, "unknown-declaration", e.to_string())
                    .await;
                return;
            }
        };
        let expected = ExpectedDeclaration {
            declaration_id: declaration.id,
            form_code: declaration.form_code(),
            period: declaration.period,
            confirmation_number: declaration.confirmation_number.clone(),
        };

        let event = match self.validator.validate_and_store(&receipt, &expected).await {
            Ok(outcome) if outcome.stored.is_some() => {
                log_declaration_event!(
                    info,
                    "confirmation",
                    "Receipt stored",
                    declaration.id,
                    confirmation_number = %confirmation_number,
                    duplicate = outcome.duplicate,
                    warnings = outcome.report.warnings.len()
                );
                FilingEvent::ConfirmationStored {
                    declaration_id: declaration.id,
                    confirmation_number: confirmation_number.clone(),
                    duplicate: outcome.duplicate,
                }
            }
            Ok(outcome) => {
                let errors = outcome.report.error_summary();
                warn!(
                    declaration_id = %declaration.id,
                    %confirmation_number,
                    ?errors,
                    "Receipt rejected"
                );
                FilingEvent::ConfirmationInvalid {
                    declaration_id: declaration.id,
                    confirmation_number: confirmation_number.clone(),
                    errors,
                }
            }
            Err(e) => {
                warn!(
                    declaration_id = %declaration.id,
                    %confirmation_number,
                    error = %e,
                    "Receipt unreadable"
                );
                FilingEvent::ConfirmationInvalid {
                    declaration_id: declaration.id,
                    confirmation_number: confirmation_number.clone(),
                    errors: vec![e.to_string()],
                }
            }
        };
        self.publisher.publish(event).await;
    }

    /// Ask the authority for the receipt of an accepted submission.
    async fn fetch_receipt(&self, declaration_id: DeclarationId, confirmation_number: &str) -> Option<String> {
        match self.transport.check_status(confirmation_number).await {
            Ok(report) => match report.receipt {
                Some(receipt) => Some(receipt),
                None => {
                    self.critical(
                        declaration_id,
                        "missing-receipt",
                        format!("status response for {confirmation_number} carried no receipt"),
                    )
                    .await;
                    None
                }
            },
            Err(e) => {
                self.critical(declaration_id, "receipt-unavailable", e.to_string())
                    .await;
                None
            }
        }
    }

    async fn critical(&self, declaration_id: DeclarationId, error_type: &str, message: String) {
        warn!(%declaration_id, error_type, %message, "Confirmation needs manual review");
        metric_inc!(COMPONENT_ERRORS, &["confirmation", error_type]);
        self.publisher
            .publish(FilingEvent::CriticalError {
                component_id: component_ids::CONFIRMATION,
                declaration_id: Some(declaration_id),
                error_type: error_type.to_string(),
                message,
            })
            .await;
    }
}
