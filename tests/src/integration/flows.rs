//! # Filing Flows
//!
//! Totals → render → validate → sign → submit → sweep → receipt, through
//! the container's components and bus.
//!
//! ```text
//! FilingPipeline ──submit──→ Authority (scripted)
//!       ↓ ready/signed              ↑ poll
//! StatusTracker ←──sweep── PollScheduler
//!       │ OutcomeAccepted
//!       ↓
//! ConfirmationHandler ──→ ConfirmationStored / ConfirmationInvalid
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_bus::{EventFilter, EventTopic, FilingEvent, Subscription};
    use shared_types::{DeclarationStatus, DeclarationType, SignatureType};
    use tf_03_signature::{embedded_fragment, SignatureEngineApi, StrategyConfig};
    use tf_04_transport::TransportStatus;
    use tf_06_status_tracker::StatusTrackerApi;
    use tf_07_confirmation::ConfirmationStore;
    use tokio::time::timeout;

    use filing_runtime::{FilingRequest, PipelineError, TotalsError};

    use crate::integration::fixtures::*;

    async fn next_event(subscription: &mut Subscription) -> FilingEvent {
        timeout(Duration::from_secs(5), subscription.recv())
            .await
            .expect("no event within 5s")
            .expect("bus closed")
    }

    fn take_acceptance(lifecycle: &mut Subscription) -> FilingEvent {
        loop {
            match lifecycle.try_recv() {
                Ok(Some(event @ FilingEvent::OutcomeAccepted { .. })) => return event,
                Ok(Some(_)) => continue,
                other => panic!("no OutcomeAccepted: {other:?}"),
            }
        }
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_filed_declaration_is_accepted_and_receipt_stored() {
        let h = Harness::new();
        let (handler, subscription) = h.container.confirmation_handler();
        let mut confirmations = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Confirmation]));
        tokio::spawn(handler.run(subscription));

        h.transport.push_submit(Ok(queued(NUMBER)));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();
        assert_eq!(declaration.status, DeclarationStatus::Submitted);
        assert_eq!(declaration.confirmation_number.as_deref(), Some(NUMBER));
        assert_eq!(declaration.signature_type(), Some(SignatureType::LocalCertificate));

        // The authority received the signed document, with the record kept.
        let submitted = h.transport.submitted();
        assert_eq!(submitted.len(), 1);
        assert!(embedded_fragment(&submitted[0]).is_some());
        assert!(submitted[0].contains("1234567890"));
        assert_eq!(h.container.signer.records(declaration.id).len(), 1);

        // Still being processed.
        h.transport
            .push_poll(Ok(status(NUMBER, TransportStatus::Processing, 301, None)));
        let report = h.sweep().await;
        assert_eq!(report.polled, 1);
        let current = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::Processing);

        // Accepted with a signed receipt.
        h.transport.push_poll(Ok(status(
            NUMBER,
            TransportStatus::Accepted,
            200,
            Some(signed_receipt(NUMBER, AUTHORITY_KEY_PEM)),
        )));
        h.sweep().await;

        match next_event(&mut confirmations).await {
            FilingEvent::ConfirmationStored {
                declaration_id,
                confirmation_number,
                duplicate,
            } => {
                assert_eq!(declaration_id, declaration.id);
                assert_eq!(confirmation_number, NUMBER);
                assert!(!duplicate);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.container.confirmation_store.len(), 1);
        assert_eq!(h.transport.polled(), vec![NUMBER.to_string(), NUMBER.to_string()]);

        let history = h.container.tracker.history(declaration.id).await.unwrap();
        let targets: Vec<_> = history.iter().map(|entry| entry.to).collect();
        assert!(
            targets.ends_with(&[
                DeclarationStatus::Ready,
                DeclarationStatus::Submitted,
                DeclarationStatus::Processing,
                DeclarationStatus::Accepted,
            ]),
            "{targets:?}"
        );
    }

    #[tokio::test]
    async fn test_redelivered_acceptance_stores_receipt_once() {
        let h = Harness::new();
        let mut lifecycle = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));
        let mut confirmations = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Confirmation]));

        h.transport.push_submit(Ok(queued(NUMBER)));
        h.pipeline().file(&h.request()).await.unwrap();
        h.transport.push_poll(Ok(status(
            NUMBER,
            TransportStatus::Accepted,
            200,
            Some(signed_receipt(NUMBER, AUTHORITY_KEY_PEM)),
        )));
        h.sweep().await;
        let accepted = take_acceptance(&mut lifecycle);

        let (handler, _subscription) = h.container.confirmation_handler();
        handler.handle(&accepted).await;
        handler.handle(&accepted).await;

        assert!(matches!(
            confirmations.try_recv(),
            Ok(Some(FilingEvent::ConfirmationStored { duplicate: false, .. }))
        ));
        assert!(matches!(
            confirmations.try_recv(),
            Ok(Some(FilingEvent::ConfirmationStored { duplicate: true, .. }))
        ));
        assert_eq!(h.container.confirmation_store.len(), 1);
    }

    // =========================================================================
    // RECEIPT FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_receipt_signed_by_stranger_is_not_stored() {
        let h = Harness::new();
        let (handler, subscription) = h.container.confirmation_handler();
        let mut confirmations = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Confirmation]));
        tokio::spawn(handler.run(subscription));

        h.transport.push_submit(Ok(queued(NUMBER)));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();
        h.transport.push_poll(Ok(status(
            NUMBER,
            TransportStatus::Accepted,
            200,
            Some(signed_receipt(NUMBER, STRANGER_KEY_PEM)),
        )));
        h.sweep().await;

        match next_event(&mut confirmations).await {
            FilingEvent::ConfirmationInvalid { errors, .. } => {
                assert!(errors.iter().any(|e| e.contains("invalid-signature")), "{errors:?}");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.container.confirmation_store.is_empty());

        // The authority's decision stands; only the receipt is in question.
        let current = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_rejected_declaration_gets_no_receipt() {
        let h = Harness::new();
        let mut lifecycle = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));

        h.transport.push_submit(Ok(queued(NUMBER)));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();
        h.transport
            .push_poll(Ok(status(NUMBER, TransportStatus::Rejected, 420, None)));
        h.sweep().await;

        let current = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::Rejected);
        while let Ok(Some(event)) = lifecycle.try_recv() {
            assert!(!matches!(event, FilingEvent::OutcomeAccepted { .. }));
        }

        // Terminal: later sweeps leave it alone.
        let report = h.sweep().await;
        assert_eq!(report.polled, 0);
        assert_eq!(h.transport.polled().len(), 1);
    }

    // =========================================================================
    // REFUSALS BEFORE THE NETWORK
    // =========================================================================

    #[tokio::test]
    async fn test_missing_totals_create_nothing() {
        let h = Harness::new();
        let request = FilingRequest::new(
            DeclarationType::VatReturn,
            march(),
            h.container.signature_config(),
        );

        let err = h.pipeline().file(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Totals(TotalsError::NotFound { .. })), "{err}");
        assert!(err.declaration_id().is_none());
        assert!(h.transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_strategy_keeps_declaration_ready() {
        let h = Harness::new();
        let request = FilingRequest::new(
            DeclarationType::VatLedger,
            march(),
            StrategyConfig::trusted_identity("acme-signer"),
        );

        let err = h.pipeline().file(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Signature { .. }), "{err}");
        let id = err.declaration_id().unwrap();

        let declaration = h.container.tracker.get(id).await.unwrap();
        assert_eq!(declaration.status, DeclarationStatus::Ready);
        assert!(!declaration.is_signed());
        assert!(h.transport.submitted().is_empty());
    }
}
