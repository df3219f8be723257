//! # Error Categories

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Timeout,
    Network,
    ProtocolFault,
    Authentication,
    Validation,
    ServiceUnavailable,
    Temporary,
    Unknown,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 8] = [
        Self::Timeout,
        Self::Network,
        Self::ProtocolFault,
        Self::Authentication,
        Self::Validation,
        Self::ServiceUnavailable,
        Self::Temporary,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::ProtocolFault => "protocol-fault",
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::ServiceUnavailable => "service-unavailable",
            Self::Temporary => "temporary",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a failure of this kind may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Network
                | Self::ProtocolFault
                | Self::ServiceUnavailable
                | Self::Temporary
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
