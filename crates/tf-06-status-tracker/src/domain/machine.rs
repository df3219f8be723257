//! # Lifecycle State Machine
//!
//! ```text
//! draft ──MarkReady──→ ready ──SubmissionAccepted──→ submitted ──OutcomeReported──→ processing
//!   ↑                    │                              │                              │
//!   └──────Reopen────────┘                              └──────────┬───────────────────┘
//!                                                                  ├─→ accepted | rejected | failed
//!                                                                  └─→ retry-pending ──RetryDue/SubmissionAccepted──→ submitted
//! failed ──OperatorReset──→ ready
//! ```
//!
//! `next_status` is pure; the tracker service persists what it returns.

use crate::domain::errors::TrackerError;
use shared_types::DeclarationStatus;

use DeclarationStatus::*;

/// Something that happened to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Validation passed.
    MarkReady,
    /// Back to draft for re-rendering.
    Reopen,
    /// The authority took the document and issued a confirmation number.
    SubmissionAccepted,
    /// A poll or submission answer carried this status.
    OutcomeReported(DeclarationStatus),
    /// Retryable failure; `exhausted` once the retry budget is spent.
    RetryableFailure { exhausted: bool },
    /// Failure that must not be retried.
    TerminalFailure,
    /// A retry-pending declaration's poll succeeded again.
    RetryDue,
    /// Manual reset of a failed declaration.
    OperatorReset,
}

impl StatusEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarkReady => "mark-ready",
            Self::Reopen => "reopen",
            Self::SubmissionAccepted => "submission-accepted",
            Self::OutcomeReported(_) => "outcome-reported",
            Self::RetryableFailure { .. } => "retryable-failure",
            Self::TerminalFailure => "terminal-failure",
            Self::RetryDue => "retry-due",
            Self::OperatorReset => "operator-reset",
        }
    }
}

pub fn next_status(
    current: DeclarationStatus,
    event: StatusEvent,
) -> Result<DeclarationStatus, TrackerError> {
    let next = match (current, event) {
        (Draft, StatusEvent::MarkReady) => Some(Ready),
        (Ready, StatusEvent::Reopen) => Some(Draft),

        (Ready | RetryPending, StatusEvent::SubmissionAccepted) => Some(Submitted),
        (RetryPending, StatusEvent::RetryDue) => Some(Submitted),

        (Submitted | Processing, StatusEvent::OutcomeReported(reported)) => match reported {
            Processing | Accepted | Rejected | Failed => Some(reported),
            _ => None,
        },

        (Ready | Submitted | Processing | RetryPending, StatusEvent::RetryableFailure { exhausted }) => {
            Some(if exhausted { Failed } else { RetryPending })
        }
        (Ready | Submitted | Processing | RetryPending, StatusEvent::TerminalFailure) => Some(Failed),

        (Failed, StatusEvent::OperatorReset) => Some(Ready),
        _ => None,
    };
    next.ok_or(TrackerError::ForbiddenTransition {
        from: current,
        event: event.name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_events() -> Vec<StatusEvent> {
        let mut events = vec![
            StatusEvent::MarkReady,
            StatusEvent::Reopen,
            StatusEvent::SubmissionAccepted,
            StatusEvent::RetryableFailure { exhausted: false },
            StatusEvent::RetryableFailure { exhausted: true },
            StatusEvent::TerminalFailure,
            StatusEvent::RetryDue,
            StatusEvent::OperatorReset,
        ];
        events.extend(DeclarationStatus::ALL.map(StatusEvent::OutcomeReported));
        events
    }

    #[test]
    fn test_happy_path() {
        let mut status = Draft;
        for (event, expected) in [
            (StatusEvent::MarkReady, Ready),
            (StatusEvent::SubmissionAccepted, Submitted),
            (StatusEvent::OutcomeReported(Processing), Processing),
            (StatusEvent::OutcomeReported(Processing), Processing),
            (StatusEvent::OutcomeReported(Accepted), Accepted),
        ] {
            status = next_status(status, event).unwrap();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_draft_cannot_jump_to_accepted() {
        assert_eq!(
            next_status(Draft, StatusEvent::OutcomeReported(Accepted)),
            Err(TrackerError::ForbiddenTransition {
                from: Draft,
                event: "outcome-reported"
            })
        );
        assert!(next_status(Draft, StatusEvent::SubmissionAccepted).is_err());
    }

    #[test]
    fn test_accepted_and_rejected_are_final() {
        for status in [Accepted, Rejected] {
            for event in all_events() {
                assert!(next_status(status, event).is_err(), "{status} + {event:?}");
            }
        }
    }

    #[test]
    fn test_only_operator_reset_leaves_failed() {
        for event in all_events() {
            let result = next_status(Failed, event);
            if event == StatusEvent::OperatorReset {
                assert_eq!(result, Ok(Ready));
            } else {
                assert!(result.is_err(), "failed + {event:?}");
            }
        }
    }

    #[test]
    fn test_retry_loop() {
        let retry = StatusEvent::RetryableFailure { exhausted: false };
        assert_eq!(next_status(Submitted, retry), Ok(RetryPending));
        assert_eq!(next_status(Processing, retry), Ok(RetryPending));
        assert_eq!(next_status(Ready, retry), Ok(RetryPending));
        assert_eq!(next_status(RetryPending, retry), Ok(RetryPending));
        assert_eq!(next_status(RetryPending, StatusEvent::RetryDue), Ok(Submitted));
        assert_eq!(next_status(RetryPending, StatusEvent::SubmissionAccepted), Ok(Submitted));
        assert_eq!(
            next_status(RetryPending, StatusEvent::RetryableFailure { exhausted: true }),
            Ok(Failed)
        );
        assert!(next_status(Draft, retry).is_err());
    }

    #[test]
    fn test_reopen_only_from_ready() {
        assert_eq!(next_status(Ready, StatusEvent::Reopen), Ok(Draft));
        for status in [Draft, Submitted, Processing, RetryPending, Accepted, Rejected, Failed] {
            assert!(next_status(status, StatusEvent::Reopen).is_err());
        }
    }

    #[test]
    fn test_outcome_must_move_forward() {
        assert!(next_status(Submitted, StatusEvent::OutcomeReported(Submitted)).is_err());
        assert!(next_status(Processing, StatusEvent::OutcomeReported(Draft)).is_err());
        assert!(next_status(RetryPending, StatusEvent::OutcomeReported(Accepted)).is_err());
        assert_eq!(
            next_status(Submitted, StatusEvent::OutcomeReported(Rejected)),
            Ok(Rejected)
        );
    }
}
