//! # Status Tracker Service
//!
//! Drives declarations through their lifecycle. Every transition goes
//! through `next_status`, is committed together with its audit entry and is
//! then published on the bus. Transport failures are classified before
//! anything is committed.

use crate::domain::errors::{TrackerError, TrackerResult};
use crate::domain::locks::LockRegistry;
use crate::domain::machine::{next_status, StatusEvent};
use crate::ports::inbound::{StatusTrackerApi, SweepReport};
use crate::ports::outbound::{Clock, DeclarationRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use shared_bus::{component_ids, EventPublisher, FilingEvent};
use shared_types::{
    AuditEntry, Declaration, DeclarationId, DeclarationStatus, DeclarationType, DomainError,
    FailureContext, ReportingPeriod, SignatureType, TransitionTrigger, Variant,
};
use std::sync::Arc;
use std::time::Duration;
use tf_04_transport::{FilingTransport, StatusReport, SubmissionReceipt, TransportError, TransportStatus};
use tf_05_error_classifier::{FailureClassifier, RetryDecision};
use tracing::{debug, error, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Declarations handled concurrently within one sweep batch
    pub batch_size: usize,
    /// How long caller actions wait for a busy declaration
    pub lock_wait: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }
}

enum SweepOutcome {
    Polled,
    Resubmitted,
    SkippedLocked,
    Idle,
    Failed,
}

pub struct StatusTracker {
    repository: Arc<dyn DeclarationRepository>,
    transport: Arc<dyn FilingTransport>,
    classifier: Arc<dyn FailureClassifier>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    locks: LockRegistry,
    config: TrackerConfig,
}

impl StatusTracker {
    pub fn new(
        repository: Arc<dyn DeclarationRepository>,
        transport: Arc<dyn FilingTransport>,
        classifier: Arc<dyn FailureClassifier>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            repository,
            transport,
            classifier,
            publisher,
            clock,
            locks: LockRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Apply `event`, then commit the declaration with its audit entry.
    async fn commit_transition(
        &self,
        declaration: &mut Declaration,
        event: StatusEvent,
        reason: &str,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        let from = declaration.status;
        let to = next_status(from, event)?;
        let now = self.clock.now();

        declaration.status = to;
        declaration.updated_at = now;
        let entry = AuditEntry {
            declaration_id: declaration.id,
            from,
            to,
            reason: reason.to_string(),
            trigger,
            at: now,
        };
        if let Err(e) = self.repository.commit(declaration, Some(entry)) {
            declaration.status = from;
            return Err(e.into());
        }

        info!(
            declaration_id = %declaration.id,
            %from,
            %to,
            trigger = trigger.as_str(),
            reason,
            "Status changed"
        );
        self.publisher
            .publish(FilingEvent::StatusChanged {
                declaration_id: declaration.id,
                from,
                to,
                trigger,
                reason: reason.to_string(),
            })
            .await;
        Ok(())
    }

    /// Commit a field change that is not a status transition.
    fn touch(&self, declaration: &mut Declaration) -> TrackerResult<()> {
        declaration.updated_at = self.clock.now();
        self.repository.commit(declaration, None)?;
        Ok(())
    }

    async fn submit_locked(
        &self,
        declaration: &mut Declaration,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        // Refuse before any network call.
        next_status(declaration.status, StatusEvent::SubmissionAccepted)?;
        if !declaration.is_signed() {
            return Err(TrackerError::NotSigned(declaration.id));
        }
        let document = declaration
            .document()
            .ok_or(DomainError::NoDocument)?
            .to_string();

        debug!(declaration_id = %declaration.id, size = document.len(), "Submitting declaration");
        match self.transport.submit(&document).await {
            Ok(receipt) => self.record_submission(declaration, receipt, trigger).await,
            Err(e) => self.record_failure(declaration, &e, trigger).await,
        }
    }

    async fn record_submission(
        &self,
        declaration: &mut Declaration,
        receipt: SubmissionReceipt,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        if receipt.status == TransportStatus::Error {
            let error = TransportError::UnexpectedResponse(format!(
                "submission answered with status {}: {}",
                receipt.status_code,
                receipt.message.as_deref().unwrap_or("no message")
            ));
            return self.record_failure(declaration, &error, trigger).await;
        }

        let now = self.clock.now();
        declaration.confirmation_number = Some(receipt.confirmation_number.clone());
        declaration.confirmation_date = receipt.confirmation_date;
        declaration.submitted_at = Some(now);
        declaration.clear_retry_state();

        let reason = format!("submitted, confirmation number {}", receipt.confirmation_number);
        if let Err(e) = self
            .commit_transition(declaration, StatusEvent::SubmissionAccepted, &reason, trigger)
            .await
        {
            // The authority has the document but we could not record it.
            error!(
                declaration_id = %declaration.id,
                confirmation_number = %receipt.confirmation_number,
                error = %e,
                "Submission accepted by authority but not recorded"
            );
            self.publisher
                .publish(FilingEvent::CriticalError {
                    component_id: component_ids::STATUS_TRACKER,
                    declaration_id: Some(declaration.id),
                    error_type: "unrecorded-submission".into(),
                    message: e.to_string(),
                })
                .await;
            return Err(e);
        }

        if let Some(reported) = receipt.status.declaration_status() {
            let description = receipt.message.unwrap_or_else(|| "reported at submission".into());
            self.record_outcome(declaration, reported, &description, None, trigger)
                .await?;
        }
        Ok(())
    }

    async fn record_outcome(
        &self,
        declaration: &mut Declaration,
        reported: DeclarationStatus,
        description: &str,
        receipt: Option<String>,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        // Repeats and "still queued" answers change nothing.
        if reported == declaration.status || reported == DeclarationStatus::Submitted {
            debug!(declaration_id = %declaration.id, status = %reported, "No status change");
            return Ok(());
        }
        let reason = if description.is_empty() {
            format!("authority reported {reported}")
        } else {
            format!("authority reported {reported}: {description}")
        };
        self.commit_transition(declaration, StatusEvent::OutcomeReported(reported), &reason, trigger)
            .await?;

        if reported == DeclarationStatus::Accepted {
            if let Some(number) = declaration.confirmation_number.clone() {
                self.publisher
                    .publish(FilingEvent::OutcomeAccepted {
                        declaration_id: declaration.id,
                        confirmation_number: number,
                        receipt,
                    })
                    .await;
            }
        }
        Ok(())
    }

    /// Classify, decide, commit. Never retries inline.
    async fn record_failure(
        &self,
        declaration: &mut Declaration,
        error: &TransportError,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        let classification = self.classifier.classify(error);
        let now = self.clock.now();
        let decision = self
            .classifier
            .decide(&classification, declaration.retry_count, now);

        let category = classification.category.to_string();
        declaration.last_error = Some(FailureContext {
            category: category.clone(),
            message: classification.context.clone(),
            retryable: classification.is_retryable(),
            recorded_at: now,
        });
        let reason = format!("{category}: {}", classification.context);

        match decision {
            RetryDecision::Retry {
                attempt,
                next_retry_at,
                ..
            } => {
                declaration.retry_count = attempt;
                declaration.next_retry_at = Some(next_retry_at);
                self.commit_transition(
                    declaration,
                    StatusEvent::RetryableFailure { exhausted: false },
                    &reason,
                    trigger,
                )
                .await?;
                self.publisher
                    .publish(FilingEvent::RetryScheduled {
                        declaration_id: declaration.id,
                        attempt,
                        category,
                        next_retry_at,
                    })
                    .await;
            }
            RetryDecision::Exhausted { attempts } => {
                declaration.retry_count = attempts;
                declaration.next_retry_at = None;
                self.commit_transition(
                    declaration,
                    StatusEvent::RetryableFailure { exhausted: true },
                    &format!("retries exhausted after {attempts} failures; {reason}"),
                    trigger,
                )
                .await?;
                self.report_failed(declaration, category).await;
            }
            RetryDecision::Terminal => {
                declaration.next_retry_at = None;
                self.commit_transition(declaration, StatusEvent::TerminalFailure, &reason, trigger)
                    .await?;
                self.report_failed(declaration, category).await;
            }
        }
        Ok(())
    }

    async fn report_failed(&self, declaration: &Declaration, category: String) {
        let message = declaration
            .last_error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        self.publisher
            .publish(FilingEvent::CriticalError {
                component_id: component_ids::STATUS_TRACKER,
                declaration_id: Some(declaration.id),
                error_type: category,
                message,
            })
            .await;
    }

    async fn poll_locked(
        &self,
        declaration: &mut Declaration,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        match declaration.status {
            DeclarationStatus::Submitted
            | DeclarationStatus::Processing
            | DeclarationStatus::RetryPending => {}
            other => {
                return Err(TrackerError::ForbiddenTransition {
                    from: other,
                    event: "poll",
                })
            }
        }
        let number = declaration
            .confirmation_number
            .clone()
            .ok_or(TrackerError::NoConfirmationNumber(declaration.id))?;

        match self.transport.check_status(&number).await {
            Ok(report) => self.record_report(declaration, report, trigger).await,
            Err(e) => self.record_failure(declaration, &e, trigger).await,
        }
    }

    async fn record_report(
        &self,
        declaration: &mut Declaration,
        report: StatusReport,
        trigger: TransitionTrigger,
    ) -> TrackerResult<()> {
        let Some(reported) = report.status.declaration_status() else {
            let error = TransportError::UnexpectedResponse(format!(
                "status poll answered with status {}: {}",
                report.status_code, report.status_description
            ));
            return self.record_failure(declaration, &error, trigger).await;
        };

        if declaration.status == DeclarationStatus::RetryPending {
            declaration.clear_retry_state();
            self.commit_transition(
                declaration,
                StatusEvent::RetryDue,
                "status poll succeeded after retry",
                trigger,
            )
            .await?;
        }
        if reported == DeclarationStatus::Accepted && declaration.confirmation_date.is_none() {
            declaration.confirmation_date = report.processing_date;
        }
        self.record_outcome(
            declaration,
            reported,
            &report.status_description,
            report.receipt,
            trigger,
        )
        .await
    }

    async fn sweep_one(&self, id: DeclarationId, now: DateTime<Utc>) -> SweepOutcome {
        let Some(_guard) = self.locks.try_acquire(id) else {
            debug!(declaration_id = %id, "Declaration busy, skipped by sweep");
            return SweepOutcome::SkippedLocked;
        };
        let mut declaration = match self.repository.get(id) {
            Ok(d) => d,
            Err(e) => {
                warn!(declaration_id = %id, error = %e, "Sweep could not load declaration");
                return SweepOutcome::Failed;
            }
        };

        let trigger = TransitionTrigger::Sweep;
        let result = match declaration.status {
            DeclarationStatus::RetryPending
                if declaration.next_retry_at.is_some_and(|at| at <= now) =>
            {
                if declaration.confirmation_number.is_some() {
                    self.poll_locked(&mut declaration, trigger)
                        .await
                        .map(|()| SweepOutcome::Polled)
                } else {
                    self.submit_locked(&mut declaration, trigger)
                        .await
                        .map(|()| SweepOutcome::Resubmitted)
                }
            }
            DeclarationStatus::Submitted | DeclarationStatus::Processing
                if declaration.confirmation_number.is_some() =>
            {
                self.poll_locked(&mut declaration, trigger)
                    .await
                    .map(|()| SweepOutcome::Polled)
            }
            // Changed since the candidate list was taken.
            _ => Ok(SweepOutcome::Idle),
        };
        result.unwrap_or_else(|e| {
            warn!(declaration_id = %id, error = %e, "Sweep step failed");
            SweepOutcome::Failed
        })
    }
}

#[async_trait]
impl StatusTrackerApi for StatusTracker {
    async fn create(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
        variant: Variant,
    ) -> TrackerResult<Declaration> {
        let declaration = Declaration::new(declaration_type, period, variant, self.clock.now());
        self.repository.insert(declaration.clone())?;
        info!(
            declaration_id = %declaration.id,
            form_code = %declaration.form_code(),
            %period,
            "Declaration created"
        );
        Ok(declaration)
    }

    async fn attach_document(&self, id: DeclarationId, content: String) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        if declaration.status != DeclarationStatus::Draft {
            return Err(TrackerError::ForbiddenTransition {
                from: declaration.status,
                event: "attach-document",
            });
        }
        declaration.attach_document(content)?;
        self.touch(&mut declaration)?;
        Ok(declaration)
    }

    async fn mark_ready(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        if declaration.document().is_none() {
            return Err(DomainError::NoDocument.into());
        }
        self.commit_transition(&mut declaration, StatusEvent::MarkReady, reason, TransitionTrigger::Caller)
            .await?;
        Ok(declaration)
    }

    async fn attach_signed_document(
        &self,
        id: DeclarationId,
        content: String,
        signature_type: SignatureType,
    ) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        if declaration.status != DeclarationStatus::Ready {
            return Err(TrackerError::ForbiddenTransition {
                from: declaration.status,
                event: "attach-signature",
            });
        }
        declaration.embed_signed_document(content, signature_type);
        self.touch(&mut declaration)?;
        debug!(declaration_id = %id, %signature_type, "Signed document stored");
        Ok(declaration)
    }

    async fn reopen(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        next_status(declaration.status, StatusEvent::Reopen)?;
        declaration.reopen();
        self.commit_transition(&mut declaration, StatusEvent::Reopen, reason, TransitionTrigger::Caller)
            .await?;
        Ok(declaration)
    }

    async fn submit(&self, id: DeclarationId) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        self.submit_locked(&mut declaration, TransitionTrigger::Transport)
            .await?;
        Ok(declaration)
    }

    async fn poll(&self, id: DeclarationId) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        self.poll_locked(&mut declaration, TransitionTrigger::Transport)
            .await?;
        Ok(declaration)
    }

    async fn reset_failed(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration> {
        let _guard = self.locks.acquire(id, self.config.lock_wait).await?;
        let mut declaration = self.repository.get(id)?;
        next_status(declaration.status, StatusEvent::OperatorReset)?;
        // The last error stays on record for review.
        declaration.clear_retry_state();
        self.commit_transition(
            &mut declaration,
            StatusEvent::OperatorReset,
            reason,
            TransitionTrigger::Operator,
        )
        .await?;
        Ok(declaration)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut candidates = self.repository.due_retries(now);
        for id in self.repository.awaiting_outcome() {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }

        let mut report = SweepReport::default();
        for batch in candidates.chunks(self.config.batch_size.max(1)) {
            let outcomes = join_all(batch.iter().map(|id| self.sweep_one(*id, now))).await;
            for outcome in outcomes {
                report.examined += 1;
                match outcome {
                    SweepOutcome::Polled => report.polled += 1,
                    SweepOutcome::Resubmitted => report.resubmitted += 1,
                    SweepOutcome::SkippedLocked => report.skipped_locked += 1,
                    SweepOutcome::Failed => report.errors += 1,
                    SweepOutcome::Idle => {}
                }
            }
        }
        self.locks.prune();

        if report.examined > 0 {
            info!(
                examined = report.examined,
                polled = report.polled,
                resubmitted = report.resubmitted,
                skipped_locked = report.skipped_locked,
                errors = report.errors,
                "Sweep finished"
            );
        }
        report
    }

    async fn history(&self, id: DeclarationId) -> TrackerResult<Vec<AuditEntry>> {
        Ok(self.repository.audit_trail(id)?)
    }

    async fn get(&self, id: DeclarationId) -> TrackerResult<Declaration> {
        Ok(self.repository.get(id)?)
    }
}
