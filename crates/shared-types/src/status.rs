//! # Classification Enums
//!
//! Declaration status, declaration type, filing variant, form code and
//! signature type. All of them have a stable string form used in documents,
//! audit entries and logs.

use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// DECLARATION STATUS
// =============================================================================

/// Lifecycle status of a declaration.
///
/// ```text
/// [draft] ─→ [ready] ─→ [submitted] ─→ [processing] ─→ [accepted | rejected | failed]
///                 │            │              │
///                 └────────────┴──────────────┴──→ [retry-pending] ──→ [submitted]
/// [failed] ──operator reset──→ [ready]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationStatus {
    /// Created, document may still change.
    Draft,
    /// Validation passed; eligible for signing and submission.
    Ready,
    /// Accepted for processing by the authority transport.
    Submitted,
    /// Authority reports the document is being processed.
    Processing,
    /// A retryable failure occurred; waiting for `next_retry_at`.
    RetryPending,
    /// Authority accepted the declaration.
    Accepted,
    /// Authority rejected the declaration.
    Rejected,
    /// Terminal failure; requires manual review.
    Failed,
}

impl DeclarationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [DeclarationStatus; 8] = [
        Self::Draft,
        Self::Ready,
        Self::Submitted,
        Self::Processing,
        Self::RetryPending,
        Self::Accepted,
        Self::Rejected,
        Self::Failed,
    ];

    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::RetryPending => "retry-pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// No automatic transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Failed)
    }

    /// Statuses the poll sweep queries the authority for.
    pub fn is_awaiting_outcome(&self) -> bool {
        matches!(self, Self::Submitted | Self::Processing)
    }
}

impl fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclarationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// DECLARATION TYPE / VARIANT / FORM CODE
// =============================================================================

/// Filing frequency subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Monthly,
    Quarterly,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of declaration being filed. Each type has its own document schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationType {
    /// Ledger-style VAT filing with itemised sales and purchase rows.
    VatLedger,
    /// Single-section VAT return.
    VatReturn,
}

impl DeclarationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VatLedger => "vat-ledger",
            Self::VatReturn => "vat-return",
        }
    }

    /// Form code the authority expects for this type and variant.
    pub fn form_code(&self, variant: Variant) -> FormCode {
        match (self, variant) {
            (Self::VatLedger, Variant::Monthly) => FormCode::JpkV7m,
            (Self::VatLedger, Variant::Quarterly) => FormCode::JpkV7k,
            (Self::VatReturn, Variant::Monthly) => FormCode::Vat7,
            (Self::VatReturn, Variant::Quarterly) => FormCode::Vat7k,
        }
    }
}

impl fmt::Display for DeclarationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclarationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "vat-ledger" => Ok(Self::VatLedger),
            "vat-return" => Ok(Self::VatReturn),
            other => Err(DomainError::UnknownDeclarationType(other.to_string())),
        }
    }
}

/// Authority form codes supported by this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormCode {
    JpkV7m,
    JpkV7k,
    Vat7,
    Vat7k,
}

impl FormCode {
    /// The supported set.
    pub const ALL: [FormCode; 4] = [Self::JpkV7m, Self::JpkV7k, Self::Vat7, Self::Vat7k];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JpkV7m => "JPK_V7M",
            Self::JpkV7k => "JPK_V7K",
            Self::Vat7 => "VAT-7",
            Self::Vat7k => "VAT-7K",
        }
    }

    pub fn declaration_type(&self) -> DeclarationType {
        match self {
            Self::JpkV7m | Self::JpkV7k => DeclarationType::VatLedger,
            Self::Vat7 | Self::Vat7k => DeclarationType::VatReturn,
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Self::JpkV7m | Self::Vat7 => Variant::Monthly,
            Self::JpkV7k | Self::Vat7k => Variant::Quarterly,
        }
    }
}

impl fmt::Display for FormCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| DomainError::UnknownFormCode(s.to_string()))
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// Signing strategy used for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureType {
    /// Authentication delegated to an external identity service.
    TrustedIdentity,
    /// Local private key and X.509 certificate.
    LocalCertificate,
    /// Placeholder marker for non-production paths.
    None,
}

impl SignatureType {
    pub const ALL: [SignatureType; 3] = [Self::TrustedIdentity, Self::LocalCertificate, Self::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrustedIdentity => "trusted-identity",
            Self::LocalCertificate => "local-certificate",
            Self::None => "none",
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSignatureType(s.to_string()))
    }
}

/// Validation status of a signature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureValidationStatus {
    Pending,
    Valid,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_type_parses_display_form() {
        for ty in [DeclarationType::VatLedger, DeclarationType::VatReturn] {
            assert_eq!(ty.to_string().parse::<DeclarationType>(), Ok(ty));
        }
        assert!("vat".parse::<DeclarationType>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = DeclarationStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                DeclarationStatus::Accepted,
                DeclarationStatus::Rejected,
                DeclarationStatus::Failed
            ]
        );
    }

    #[test]
    fn test_status_string_forms() {
        assert_eq!(DeclarationStatus::RetryPending.as_str(), "retry-pending");
        assert_eq!(
            "retry-pending".parse::<DeclarationStatus>().unwrap(),
            DeclarationStatus::RetryPending
        );
        assert!("pending".parse::<DeclarationStatus>().is_err());
    }

    #[test]
    fn test_status_serde_matches_display() {
        let json = serde_json::to_string(&DeclarationStatus::RetryPending).unwrap();
        assert_eq!(json, "\"retry-pending\"");
    }

    #[test]
    fn test_form_code_per_type_and_variant() {
        assert_eq!(
            DeclarationType::VatLedger.form_code(Variant::Monthly),
            FormCode::JpkV7m
        );
        assert_eq!(
            DeclarationType::VatLedger.form_code(Variant::Quarterly),
            FormCode::JpkV7k
        );
        assert_eq!(
            DeclarationType::VatReturn.form_code(Variant::Quarterly),
            FormCode::Vat7k
        );
        for code in FormCode::ALL {
            assert_eq!(code.declaration_type().form_code(code.variant()), code);
        }
    }

    #[test]
    fn test_form_code_parse() {
        assert_eq!("VAT-7K".parse::<FormCode>().unwrap(), FormCode::Vat7k);
        assert_eq!(
            "PIT-37".parse::<FormCode>(),
            Err(DomainError::UnknownFormCode("PIT-37".into()))
        );
    }
}
