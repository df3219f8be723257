//! # Failure Handling Flows
//!
//! Transport failures classified by tf-05 and committed by tf-06, with
//! retries driven only by the scheduler's sweeps.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use shared_bus::{component_ids, EventFilter, EventTopic, FilingEvent};
    use shared_types::DeclarationStatus;
    use tf_04_transport::{TransportError, TransportStatus};
    use tf_06_status_tracker::{Clock, StatusTrackerApi};

    use crate::integration::fixtures::*;

    fn timeout_error() -> TransportError {
        TransportError::Timeout("no answer within 30s".into())
    }

    #[tokio::test]
    async fn test_retries_exhaust_then_operator_reset_resubmits() {
        let h = Harness::new();
        let mut dead_letters = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::DeadLetterQueue]));

        // Attempt 1 fails during filing.
        h.transport.push_submit(Err(timeout_error()));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();
        assert_eq!(declaration.status, DeclarationStatus::RetryPending);
        assert_eq!(declaration.retry_count, 1);
        assert_eq!(
            declaration.next_retry_at,
            Some(h.clock.now() + ChronoDuration::seconds(60))
        );

        // Not due yet: nothing is sent.
        let report = h.sweep().await;
        assert_eq!(report.resubmitted, 0);
        assert_eq!(h.transport.submitted().len(), 1);

        // Attempt 2 fails on the sweep after the backoff.
        h.advance(ChronoDuration::seconds(61));
        h.transport.push_submit(Err(timeout_error()));
        let report = h.sweep().await;
        assert_eq!(report.resubmitted, 1);
        let current = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::RetryPending);
        assert_eq!(current.retry_count, 2);

        // Attempt 3 exhausts the budget.
        h.advance(ChronoDuration::hours(1));
        h.transport.push_submit(Err(timeout_error()));
        h.sweep().await;
        let failed = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(failed.status, DeclarationStatus::Failed);
        assert_eq!(failed.next_retry_at, None);
        assert_eq!(failed.last_error.as_ref().map(|e| e.category.as_str()), Some("timeout"));
        assert_eq!(h.transport.submitted().len(), 3);

        match dead_letters.try_recv() {
            Ok(Some(FilingEvent::CriticalError {
                component_id,
                declaration_id,
                error_type,
                ..
            })) => {
                assert_eq!(component_id, component_ids::STATUS_TRACKER);
                assert_eq!(declaration_id, Some(declaration.id));
                assert_eq!(error_type, "timeout");
            }
            other => panic!("unexpected {other:?}"),
        }

        // Failed declarations are never swept.
        h.advance(ChronoDuration::days(1));
        h.sweep().await;
        assert_eq!(h.transport.submitted().len(), 3);

        // An operator puts it back; the signed document is still there.
        let reset = h
            .container
            .tracker
            .reset_failed(declaration.id, "authority outage over")
            .await
            .unwrap();
        assert_eq!(reset.status, DeclarationStatus::Ready);
        assert_eq!(reset.retry_count, 0);
        assert!(reset.last_error.is_some());
        assert!(reset.is_signed());

        h.transport.push_submit(Ok(queued(NUMBER)));
        let resubmitted = h.container.tracker.submit(declaration.id).await.unwrap();
        assert_eq!(resubmitted.status, DeclarationStatus::Submitted);
        assert_eq!(resubmitted.confirmation_number.as_deref(), Some(NUMBER));
    }

    #[tokio::test]
    async fn test_authentication_failure_is_terminal() {
        let h = Harness::new();
        let mut dead_letters = h
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::DeadLetterQueue]));

        h.transport.push_submit(Err(TransportError::HttpStatus {
            status: 401,
            body: "certificate not recognised".into(),
            retry_after: None,
        }));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();

        assert_eq!(declaration.status, DeclarationStatus::Failed);
        assert_eq!(declaration.retry_count, 0);
        let error = declaration.last_error.unwrap();
        assert_eq!(error.category, "authentication");
        assert!(!error.retryable);
        assert!(matches!(
            dead_letters.try_recv(),
            Ok(Some(FilingEvent::CriticalError { error_type, .. })) if error_type == "authentication"
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_waits_for_server_delay() {
        let h = Harness::new();
        h.transport.push_submit(Err(TransportError::HttpStatus {
            status: 429,
            body: "slow down".into(),
            retry_after: Some(Duration::from_secs(600)),
        }));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();
        assert_eq!(declaration.status, DeclarationStatus::RetryPending);
        // The server's delay replaces the computed backoff.
        assert_eq!(
            declaration.next_retry_at,
            Some(h.clock.now() + ChronoDuration::seconds(600))
        );

        h.advance(ChronoDuration::seconds(300));
        assert_eq!(h.sweep().await.resubmitted, 0);

        h.advance(ChronoDuration::seconds(301));
        h.transport.push_submit(Ok(queued(NUMBER)));
        assert_eq!(h.sweep().await.resubmitted, 1);

        let current = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::Submitted);
        assert_eq!(current.retry_count, 0);
    }

    #[tokio::test]
    async fn test_failed_poll_is_retried_as_poll() {
        let h = Harness::new();
        h.transport.push_submit(Ok(queued(NUMBER)));
        let declaration = h.pipeline().file(&h.request()).await.unwrap();

        h.transport
            .push_poll(Err(TransportError::Network("connection reset".into())));
        h.sweep().await;
        let pending = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(pending.status, DeclarationStatus::RetryPending);
        assert_eq!(pending.confirmation_number.as_deref(), Some(NUMBER));

        h.advance(ChronoDuration::minutes(5));
        h.transport.push_poll(Ok(status(
            NUMBER,
            TransportStatus::Accepted,
            200,
            Some(signed_receipt(NUMBER, AUTHORITY_KEY_PEM)),
        )));
        let report = h.sweep().await;
        assert_eq!(report.polled, 1);
        assert_eq!(report.resubmitted, 0);

        let accepted = h.container.tracker.get(declaration.id).await.unwrap();
        assert_eq!(accepted.status, DeclarationStatus::Accepted);
        assert_eq!(h.transport.submitted().len(), 1);
        assert_eq!(h.transport.polled().len(), 2);
    }
}
