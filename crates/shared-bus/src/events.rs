//! # Filing Events
//!
//! Defines all event types that flow through the shared bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{DeclarationId, DeclarationStatus, FormCode, SignatureType, TransitionTrigger};

/// Numeric identifiers of the pipeline components that publish events.
pub mod component_ids {
    pub const RUNTIME: u8 = 0;
    pub const RENDERER: u8 = 1;
    pub const VALIDATOR: u8 = 2;
    pub const SIGNATURE: u8 = 3;
    pub const TRANSPORT: u8 = 4;
    pub const ERROR_CLASSIFIER: u8 = 5;
    pub const STATUS_TRACKER: u8 = 6;
    pub const CONFIRMATION: u8 = 7;
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FilingEvent {
    // =========================================================================
    // RENDERING / VALIDATION / SIGNING
    // =========================================================================
    /// A document was rendered for a declaration.
    DocumentRendered {
        declaration_id: DeclarationId,
        form_code: FormCode,
        /// Size of the rendered document in bytes.
        size: usize,
    },

    /// A document passed validation and the declaration is `ready`.
    DeclarationReady {
        declaration_id: DeclarationId,
        warnings: usize,
    },

    /// A signature was embedded into a declaration document.
    DocumentSigned {
        declaration_id: DeclarationId,
        signature_id: String,
        signature_type: SignatureType,
    },

    // =========================================================================
    // STATUS TRACKER
    // =========================================================================
    /// A status transition was committed.
    StatusChanged {
        declaration_id: DeclarationId,
        from: DeclarationStatus,
        to: DeclarationStatus,
        trigger: TransitionTrigger,
        reason: String,
    },

    /// A retryable failure was recorded; the next sweep after
    /// `next_retry_at` picks the declaration up again.
    RetryScheduled {
        declaration_id: DeclarationId,
        attempt: u32,
        category: String,
        next_retry_at: DateTime<Utc>,
    },

    /// The authority accepted the declaration.
    /// Consumed by the confirmation handler.
    OutcomeAccepted {
        declaration_id: DeclarationId,
        confirmation_number: String,
        /// Receipt document, when the status response carried one.
        receipt: Option<String>,
    },

    // =========================================================================
    // CONFIRMATION
    // =========================================================================
    /// A receipt was validated and stored (or was already on file).
    ConfirmationStored {
        declaration_id: DeclarationId,
        confirmation_number: String,
        duplicate: bool,
    },

    /// A receipt failed validation.
    ConfirmationInvalid {
        declaration_id: DeclarationId,
        confirmation_number: String,
        errors: Vec<String>,
    },

    // =========================================================================
    // DEAD LETTER
    // =========================================================================
    /// A failure that needs manual review.
    CriticalError {
        component_id: u8,
        declaration_id: Option<DeclarationId>,
        error_type: String,
        message: String,
    },
}

impl FilingEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::DocumentRendered { .. } => EventTopic::Rendering,
            Self::DeclarationReady { .. } => EventTopic::Validation,
            Self::DocumentSigned { .. } => EventTopic::Signing,
            Self::StatusChanged { .. }
            | Self::RetryScheduled { .. }
            | Self::OutcomeAccepted { .. } => EventTopic::Lifecycle,
            Self::ConfirmationStored { .. } | Self::ConfirmationInvalid { .. } => {
                EventTopic::Confirmation
            }
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating component ID.
    #[must_use]
    pub fn source_component(&self) -> u8 {
        match self {
            Self::DocumentRendered { .. } => component_ids::RENDERER,
            Self::DeclarationReady { .. } => component_ids::VALIDATOR,
            Self::DocumentSigned { .. } => component_ids::SIGNATURE,
            Self::StatusChanged { .. }
            | Self::RetryScheduled { .. }
            | Self::OutcomeAccepted { .. } => component_ids::STATUS_TRACKER,
            Self::ConfirmationStored { .. } | Self::ConfirmationInvalid { .. } => {
                component_ids::CONFIRMATION
            }
            Self::CriticalError { component_id, .. } => *component_id,
        }
    }

    /// The declaration this event is about, if any.
    #[must_use]
    pub fn declaration_id(&self) -> Option<DeclarationId> {
        match self {
            Self::DocumentRendered { declaration_id, .. }
            | Self::DeclarationReady { declaration_id, .. }
            | Self::DocumentSigned { declaration_id, .. }
            | Self::StatusChanged { declaration_id, .. }
            | Self::RetryScheduled { declaration_id, .. }
            | Self::OutcomeAccepted { declaration_id, .. }
            | Self::ConfirmationStored { declaration_id, .. }
            | Self::ConfirmationInvalid { declaration_id, .. } => Some(*declaration_id),
            Self::CriticalError { declaration_id, .. } => *declaration_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Rendering,
    Validation,
    Signing,
    /// Status transitions, retries and outcomes.
    Lifecycle,
    Confirmation,
    DeadLetterQueue,
    /// Wildcard.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to subscribe to (empty = all topics).
    pub topics: Vec<EventTopic>,
    /// Source components to accept (empty = all sources).
    pub source_components: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_components: Vec::new(),
        }
    }

    /// Create a filter for events from specific components.
    #[must_use]
    pub fn from_components(components: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_components: components,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &FilingEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_components.is_empty()
            || self.source_components.contains(&event.source_component());

        topic_match && source_match
    }
}
