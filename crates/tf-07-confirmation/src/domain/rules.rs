//! # Receipt Rules
//!
//! | Check | Failure |
//! |-------|---------|
//! | number is 32 of `[A-Z0-9]` | error |
//! | number matches the one issued at submission | error |
//! | date parses | error |
//! | date within the window around now | warning |
//! | taxpayer id is 10 or 11 digits | error |
//! | taxpayer id checksum | warning |
//! | office code is 4 digits | error |
//! | form code supported and equal to the declaration's | error |
//! | period equals the declaration's | warning |
//! | status code numeric | error |
//! | status code is 200 | warning |
//! | signature present | warning |

use crate::domain::entities::{
    ConfirmationPolicy, ConfirmationReport, ExpectedDeclaration, ParsedReceipt,
    CONFIRMATION_NUMBER_LEN,
};
use chrono::{DateTime, Duration, Utc};
use shared_types::ids::{is_valid_tax_office_code, is_valid_taxpayer_id, taxpayer_id_kind};
use shared_types::{FormCode, ReportingPeriod};
use tf_04_transport::parse_instant;

/// Authority status code of an accepted filing.
pub const ACCEPTED_STATUS: u16 = 200;

/// Exactly 32 characters, uppercase ASCII letters and digits.
pub fn is_valid_confirmation_number(value: &str) -> bool {
    value.len() == CONFIRMATION_NUMBER_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Receipt period in display form (`2024-03`, `2024-Q1`) or token form
/// (`20240301`).
fn period_matches(value: &str, expected: &ReportingPeriod) -> bool {
    match value.parse::<ReportingPeriod>() {
        Ok(period) => period == *expected,
        Err(_) => value == expected.token(),
    }
}

/// Field checks that need neither the store nor the verification key.
pub fn check_receipt(
    receipt: &ParsedReceipt,
    expected: &ExpectedDeclaration,
    policy: &ConfirmationPolicy,
    now: DateTime<Utc>,
) -> ConfirmationReport {
    let mut report = ConfirmationReport::default();

    let number = receipt.confirmation_number.as_str();
    if !is_valid_confirmation_number(number) {
        report.error(
            "invalid-confirmation-number",
            "ConfirmationNumber",
            format!("{number:?} is not {CONFIRMATION_NUMBER_LEN} uppercase alphanumeric characters"),
        );
    }
    if let Some(issued) = &expected.confirmation_number {
        if issued != number {
            report.error(
                "confirmation-number-mismatch",
                "ConfirmationNumber",
                format!("receipt is for {number}, submission was issued {issued}"),
            );
        }
    }

    match parse_instant(&receipt.confirmation_date) {
        Some(date) => {
            let window = Duration::days(policy.date_window_days);
            if date < now - window || date > now + window {
                report.warning(
                    "confirmation-date-out-of-window",
                    "ConfirmationDate",
                    format!(
                        "{} is more than {} days from now",
                        receipt.confirmation_date, policy.date_window_days
                    ),
                );
            }
        }
        None => report.error(
            "invalid-confirmation-date",
            "ConfirmationDate",
            format!("{:?} is not a date", receipt.confirmation_date),
        ),
    }

    let taxpayer = receipt.taxpayer_id.as_str();
    if taxpayer_id_kind(taxpayer).is_none() {
        report.error(
            "invalid-taxpayer-id",
            "TaxpayerId",
            format!("{taxpayer:?} is not 10 or 11 digits"),
        );
    } else if !is_valid_taxpayer_id(taxpayer) {
        report.warning(
            "taxpayer-id-checksum",
            "TaxpayerId",
            format!("{taxpayer} fails its check digit"),
        );
    }

    if !is_valid_tax_office_code(&receipt.tax_office_code) {
        report.error(
            "invalid-tax-office-code",
            "TaxOfficeCode",
            format!("{:?} is not 4 digits", receipt.tax_office_code),
        );
    }

    match receipt.form_code.parse::<FormCode>() {
        Ok(code) if code != expected.form_code => report.error(
            "form-code-mismatch",
            "FormCode",
            format!("receipt is for {code}, declaration is {}", expected.form_code),
        ),
        Ok(_) => {}
        Err(_) => report.error(
            "unsupported-form-code",
            "FormCode",
            format!("{:?} is not a supported form", receipt.form_code),
        ),
    }

    if !period_matches(&receipt.period, &expected.period) {
        report.warning(
            "period-mismatch",
            "Period",
            format!("receipt period {} differs from {}", receipt.period, expected.period),
        );
    }

    match receipt.status_code.parse::<u16>() {
        Ok(ACCEPTED_STATUS) => {}
        Ok(code) => report.warning(
            "status-not-accepted",
            "StatusCode",
            format!("status code {code}"),
        ),
        Err(_) => report.error(
            "invalid-status-code",
            "StatusCode",
            format!("{:?} is not numeric", receipt.status_code),
        ),
    }

    if receipt.signature.is_none() {
        report.warning("missing-signature", "Signature", "receipt is not signed");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse::fixtures::{unsigned_receipt, ReceiptSpec, NUMBER};
    use crate::domain::parse::parse_receipt;
    use chrono::TimeZone;
    use shared_types::DeclarationId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 12, 8, 0, 0).unwrap()
    }

    fn expected() -> ExpectedDeclaration {
        ExpectedDeclaration {
            declaration_id: DeclarationId::new(),
            form_code: FormCode::JpkV7m,
            period: ReportingPeriod::month(2024, 3).unwrap(),
            confirmation_number: Some(NUMBER.into()),
        }
    }

    fn check(spec: &ReceiptSpec<'_>) -> ConfirmationReport {
        let receipt = parse_receipt(&unsigned_receipt(spec)).unwrap();
        check_receipt(&receipt, &expected(), &ConfirmationPolicy::default(), now())
    }

    #[test]
    fn test_confirmation_number_format() {
        assert!(is_valid_confirmation_number("AB12CD34EF56GH78IJ90KL12MN34OP56"));
        assert!(!is_valid_confirmation_number("short123"));
        assert!(!is_valid_confirmation_number("AB12CD34EF56GH78IJ90KL12MN34OP567"));
        assert!(!is_valid_confirmation_number("ab12cd34ef56gh78ij90kl12mn34op56"));
        assert!(!is_valid_confirmation_number("AB12CD34EF56GH78IJ90KL12MN34OP5-"));
    }

    #[test]
    fn test_valid_receipt_only_lacks_signature() {
        let report = check(&ReceiptSpec::default());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.has_warning("missing-signature"));
    }

    #[test]
    fn test_hard_errors() {
        let report = check(&ReceiptSpec {
            number: "short123",
            taxpayer: "12345",
            office: "14A1",
            form_code: "VAT-7",
            date: "yesterday",
            status: "OK",
            ..ReceiptSpec::default()
        });
        for code in [
            "invalid-confirmation-number",
            "confirmation-number-mismatch",
            "invalid-taxpayer-id",
            "invalid-tax-office-code",
            "form-code-mismatch",
            "invalid-confirmation-date",
            "invalid-status-code",
        ] {
            assert!(report.has_error(code), "missing {code}: {:?}", report.errors);
        }

        let unknown_form = check(&ReceiptSpec {
            form_code: "PIT-37",
            ..ReceiptSpec::default()
        });
        assert!(unknown_form.has_error("unsupported-form-code"));
    }

    #[test]
    fn test_soft_findings_stay_warnings() {
        let report = check(&ReceiptSpec {
            period: "2024-02",
            date: "2024-01-02",
            status: "302",
            taxpayer: "1234567891",
            ..ReceiptSpec::default()
        });
        assert!(report.is_valid(), "{:?}", report.errors);
        for code in [
            "period-mismatch",
            "confirmation-date-out-of-window",
            "status-not-accepted",
            "taxpayer-id-checksum",
        ] {
            assert!(report.has_warning(code), "missing {code}");
        }
    }

    #[test]
    fn test_period_token_form_and_personal_id() {
        let report = check(&ReceiptSpec {
            period: "20240301",
            taxpayer: "44051401359",
            ..ReceiptSpec::default()
        });
        assert!(!report.has_warning("period-mismatch"));
        assert!(!report.has_warning("taxpayer-id-checksum"));
        assert!(report.is_valid());
    }
}
