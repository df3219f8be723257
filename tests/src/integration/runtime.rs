//! # Runtime Lifecycle
//!
//! The background handlers started by `FilingRuntime` react to what the
//! tracker publishes, and stop on shutdown.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_bus::{EventFilter, EventTopic, FilingEvent};
    use shared_types::{DeclarationStatus, DeclarationType};
    use tf_04_transport::TransportStatus;
    use tf_06_status_tracker::StatusTrackerApi;
    use tf_07_confirmation::ConfirmationStore;
    use tokio::time::timeout;

    use filing_runtime::FilingRuntime;

    use crate::integration::fixtures::*;

    #[tokio::test]
    async fn test_runtime_files_and_confirms_in_background() {
        let Harness {
            container,
            transport,
            totals,
            ..
        } = Harness::new();
        let runtime = FilingRuntime::new(container, totals);
        let mut confirmations = runtime
            .container()
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Confirmation]));

        runtime.start().await;

        // Queued up front: whichever sweep polls first gets the acceptance.
        transport.push_submit(Ok(queued(NUMBER)));
        transport.push_poll(Ok(status(
            NUMBER,
            TransportStatus::Accepted,
            200,
            Some(signed_receipt(NUMBER, AUTHORITY_KEY_PEM)),
        )));

        let declaration = runtime.file(DeclarationType::VatLedger, march()).await.unwrap();
        assert_eq!(declaration.confirmation_number.as_deref(), Some(NUMBER));
        runtime.container().scheduler().tick().await;

        let event = timeout(Duration::from_secs(5), confirmations.recv())
            .await
            .expect("no confirmation within 5s")
            .expect("bus closed");
        assert!(
            matches!(event, FilingEvent::ConfirmationStored { duplicate: false, .. }),
            "{event:?}"
        );
        assert_eq!(runtime.container().confirmation_store.len(), 1);

        let current = runtime.container().tracker.get(declaration.id).await.unwrap();
        assert_eq!(current.status, DeclarationStatus::Accepted);

        runtime.shutdown().await;
        assert!(runtime.is_shutting_down());
    }

    #[tokio::test]
    async fn test_shutdown_without_start_is_clean() {
        let Harness { container, totals, .. } = Harness::new();
        let runtime = FilingRuntime::new(container, totals);
        runtime.shutdown().await;
        assert!(runtime.is_shutting_down());
    }
}
