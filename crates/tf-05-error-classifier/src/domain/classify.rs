//! # Failure Classification
//!
//! Maps a `TransportError` (or a free-text failure) onto an `ErrorCategory`.
//!
//! | Failure | Category |
//! |---------|----------|
//! | timeout | timeout |
//! | connection failure | network |
//! | HTTP 401 / 403 | authentication |
//! | HTTP 400 / 422 | validation |
//! | HTTP 408 / 504 | timeout |
//! | HTTP 429 | temporary (keeps `Retry-After`) |
//! | HTTP 502 / 503 | service-unavailable |
//! | other HTTP 5xx | temporary |
//! | SOAP fault about authentication or security | authentication |
//! | SOAP `Client` / `Sender` fault | validation |
//! | other SOAP fault | protocol-fault |
//! | unexpected response | protocol-fault |
//! | envelope or credential failure | authentication |

use crate::domain::category::ErrorCategory;
use std::time::Duration;
use tf_04_transport::TransportError;

/// Outcome of classifying one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    /// Delay the server asked for, if any.
    pub retry_after: Option<Duration>,
    /// Error context kept on the declaration for manual review.
    pub context: String,
}

impl Classification {
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Keyword table, checked in order. The first match wins.
const KEYWORDS: &[(ErrorCategory, &[&str])] = &[
    (ErrorCategory::Timeout, &["timed out", "timeout", "deadline"]),
    (
        ErrorCategory::Authentication,
        &[
            "unauthorized",
            "unauthorised",
            "forbidden",
            "authentication",
            "security",
            "certificate",
            "credential",
            "token",
        ],
    ),
    (
        ErrorCategory::ServiceUnavailable,
        &["unavailable", "maintenance", "overloaded"],
    ),
    (
        ErrorCategory::Temporary,
        &["rate limit", "too many requests", "try again", "temporar", "busy"],
    ),
    (
        ErrorCategory::Network,
        &["connection", "network", "dns", "unreachable", "refused", "reset by peer"],
    ),
    (
        ErrorCategory::Validation,
        &["schema", "validation", "invalid", "malformed"],
    ),
    (ErrorCategory::ProtocolFault, &["fault", "soap", "protocol"]),
];

/// Category of a free-text failure message. `Unknown` when no keyword hits.
pub fn classify_message(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

fn http_category(status: u16) -> ErrorCategory {
    match status {
        401 | 403 => ErrorCategory::Authentication,
        400 | 422 => ErrorCategory::Validation,
        408 | 504 => ErrorCategory::Timeout,
        429 => ErrorCategory::Temporary,
        502 | 503 => ErrorCategory::ServiceUnavailable,
        500..=599 => ErrorCategory::Temporary,
        _ => ErrorCategory::Unknown,
    }
}

fn fault_category(code: &str, reason: &str) -> ErrorCategory {
    let text = format!("{code} {reason}").to_lowercase();
    if ["authentication", "security", "unauthorized", "credential"]
        .iter()
        .any(|w| text.contains(w))
    {
        return ErrorCategory::Authentication;
    }
    // Codes arrive qualified (`soap:Client`, `env:Sender`).
    let local = code.rsplit(':').next().unwrap_or(code);
    if local.eq_ignore_ascii_case("client") || local.eq_ignore_ascii_case("sender") {
        return ErrorCategory::Validation;
    }
    ErrorCategory::ProtocolFault
}

pub fn classify_transport(error: &TransportError) -> Classification {
    let category = match error {
        TransportError::Timeout(_) => ErrorCategory::Timeout,
        TransportError::Network(_) => ErrorCategory::Network,
        TransportError::HttpStatus { status, .. } => http_category(*status),
        TransportError::SoapFault { code, reason } => fault_category(code, reason),
        TransportError::UnexpectedResponse(_) => ErrorCategory::ProtocolFault,
        TransportError::Authentication(_) | TransportError::Envelope(_) => {
            ErrorCategory::Authentication
        }
    };
    Classification {
        category,
        retry_after: error.retry_after(),
        context: error.to_string(),
    }
}
