//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{ConfirmationOutcome, ConfirmationReport, ExpectedDeclaration, ParsedReceipt};
use crate::domain::errors::ConfirmationError;
use async_trait::async_trait;

#[async_trait]
pub trait ConfirmationValidatorApi: Send + Sync {
    /// Parse and check a receipt without storing it.
    async fn validate(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
    ) -> Result<(ParsedReceipt, ConfirmationReport), ConfirmationError>;

    /// Validate, then store the receipt if it has no errors. Storing a
    /// number that is already on file is a warning, not a failure.
    async fn validate_and_store(
        &self,
        receipt_xml: &str,
        expected: &ExpectedDeclaration,
    ) -> Result<ConfirmationOutcome, ConfirmationError>;
}
