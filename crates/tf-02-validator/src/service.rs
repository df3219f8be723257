//! # Validator Service

use crate::domain::entities::{ValidationPolicy, ValidationReport};
use crate::domain::validate::validate_document;
use crate::ports::inbound::DocumentValidator;
use chrono::{DateTime, Utc};
use shared_types::Variant;
use tracing::{debug, info};

/// Three-pass validator with fixed thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorService {
    policy: ValidationPolicy,
}

impl ValidatorService {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

impl DocumentValidator for ValidatorService {
    fn validate_at(
        &self,
        document: &str,
        variant: Variant,
        now: DateTime<Utc>,
    ) -> ValidationReport {
        let report = validate_document(document, variant, &self.policy, now);

        if report.is_valid {
            debug!(
                %variant,
                warnings = report.warnings.len(),
                "Document passed validation"
            );
        } else {
            info!(
                %variant,
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                first_error = %report.errors[0],
                "Document failed validation"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_policy_epsilon_is_applied() {
        let doc = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <VatReturn xmlns=\"urn:tax-authority:schemas:vat-return:1\">\
            <DeclarationFields>\
            <DomesticSalesNet>0</DomesticSalesNet><OutputTax>100</OutputTax>\
            <ExportSalesNet>0</ExportSalesNet><IntraCommunitySupplyNet>0</IntraCommunitySupplyNet>\
            <ReverseChargeNet>0</ReverseChargeNet><PurchaseNet>0</PurchaseNet>\
            <InputTax>40</InputTax><FixedAssetPurchaseNet>0</FixedAssetPurchaseNet>\
            <AmountDue>60.5</AmountDue><Surplus>0</Surplus>\
            </DeclarationFields></VatReturn>";
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let strict = ValidatorService::default();
        let report = strict.validate_at(doc, Variant::Monthly, now);
        assert!(report.has_error("amount-due-mismatch"));

        let lenient = ValidatorService::new(ValidationPolicy {
            epsilon: 1.0,
            ..ValidationPolicy::default()
        });
        let report = lenient.validate_at(doc, Variant::Monthly, now);
        assert!(!report.has_error("amount-due-mismatch"));
        // Header and Subject are still missing.
        assert!(report.has_error("missing-section"));
    }
}
