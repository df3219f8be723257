//! # Confirmation Validator Service

use crate::domain::entities::{
    ConfirmationOutcome, ConfirmationPolicy, ConfirmationReport, ExpectedDeclaration,
    ParsedReceipt,
};
use crate::domain::errors::ConfirmationError;
use crate::domain::parse::parse_receipt;
use crate::domain::rules::check_receipt;
use crate::ports::inbound::ConfirmationValidatorApi;
use crate::ports::outbound::{ConfirmationStore, InsertOutcome, ReceiptSignatureVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{Confirmation, FormCode};
use std::sync::Arc;
use tf_04_transport::parse_instant;
use tracing::{debug, info, warn};

pub struct ConfirmationValidator {
    store: Arc<dyn ConfirmationStore>,
    verifier: Option<Arc<dyn ReceiptSignatureVerifier>>,
    policy: ConfirmationPolicy,
}

impl ConfirmationValidator {
    pub fn new(store: Arc<dyn ConfirmationStore>, policy: ConfirmationPolicy) -> Self {
        Self {
            store,
            verifier: None,
            policy,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn ReceiptSignatureVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn validate_at(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
        now: DateTime<Utc>,
    ) -> Result<(ParsedReceipt, ConfirmationReport), ConfirmationError> {
        let receipt = parse_receipt(receipt_xml)?;
        let mut report = check_receipt(&receipt, expected, &self.policy, now);

        if let Some(signature) = &receipt.signature {
            match &self.verifier {
                Some(verifier) => {
                    if !verifier.verify(&receipt.signed_content, signature) {
                        report.error(
                            "invalid-signature",
                            "Signature",
                            "authority signature does not verify",
                        );
                    }
                }
                None => report.warning(
                    "signature-not-verified",
                    "Signature",
                    "no authority key configured",
                ),
            }
        }
        Ok((receipt, report))
    }

    pub fn store_at(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
        now: DateTime<Utc>,
    ) -> Result<ConfirmationOutcome, ConfirmationError> {
        let (receipt, mut report) = self.validate_at(receipt_xml, expected, now)?;
        if !report.is_valid() {
            warn!(
                declaration_id = %expected.declaration_id,
                confirmation_number = %receipt.confirmation_number,
                errors = report.errors.len(),
                "Receipt failed validation"
            );
            return Ok(ConfirmationOutcome {
                report,
                stored: None,
                duplicate: false,
                checked_at: now,
            });
        }

        let confirmation = into_confirmation(receipt, expected, now)?;
        let number = confirmation.confirmation_number.clone();
        let duplicate = match self.store.insert_if_absent(confirmation)? {
            InsertOutcome::Inserted => {
                info!(
                    declaration_id = %expected.declaration_id,
                    confirmation_number = %number,
                    warnings = report.warnings.len(),
                    "Confirmation stored"
                );
                false
            }
            InsertOutcome::AlreadyPresent => {
                report.warning(
                    "duplicate-confirmation",
                    "ConfirmationNumber",
                    format!("{number} is already on file"),
                );
                debug!(confirmation_number = %number, "Confirmation already on file");
                true
            }
        };

        Ok(ConfirmationOutcome {
            report,
            stored: self.store.get(&number),
            duplicate,
            checked_at: now,
        })
    }
}

/// Typed record of a receipt that passed every hard check.
fn into_confirmation(
    receipt: ParsedReceipt,
    expected: &ExpectedDeclaration,
    now: DateTime<Utc>,
) -> Result<Confirmation, ConfirmationError> {
    let malformed = |field: &str| ConfirmationError::Malformed(format!("{field} did not survive validation"));
    let confirmation_date =
        parse_instant(&receipt.confirmation_date).ok_or_else(|| malformed("ConfirmationDate"))?;
    let form_code: FormCode = receipt.form_code.parse().map_err(|_| malformed("FormCode"))?;
    let status_code: u16 = receipt.status_code.parse().map_err(|_| malformed("StatusCode"))?;

    Ok(Confirmation {
        confirmation_number: receipt.confirmation_number,
        confirmation_date,
        taxpayer_id: receipt.taxpayer_id,
        tax_office_code: receipt.tax_office_code,
        form_code,
        period: receipt.period,
        status_code,
        raw_document: receipt.raw,
        signature: receipt.signature,
        declaration_id: Some(expected.declaration_id),
        stored_at: now,
    })
}

#[async_trait]
impl ConfirmationValidatorApi for ConfirmationValidator {
    async fn validate(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
    ) -> Result<(ParsedReceipt, ConfirmationReport), ConfirmationError> {
        self.validate_at(receipt_xml, expected, Utc::now())
    }

    async fn validate_and_store(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
    ) -> Result<ConfirmationOutcome, ConfirmationError> {
        self.store_at(receipt_xml, expected, Utc::now())
    }
}
