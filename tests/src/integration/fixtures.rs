//! # Shared Fixtures
//!
//! A scripted authority, a ledger to file, receipts and a fully wired
//! container around them.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use parking_lot::Mutex;
use rcgen::{CertificateParams, DnType, KeyPair};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;

use filing_runtime::adapters::InMemoryTotalsSource;
use filing_runtime::{FilingConfig, FilingContainer, FilingInput, FilingPipeline, FilingRequest};
use shared_types::{DeclarationType, Money, ReportingPeriod};
use tf_01_renderer::{AmountField, CalculationData, EntityInfo, LedgerRow};
use tf_03_signature::{LocalCertificateStrategy, SignatureStrategy, TrustPolicy, UnsignedStrategy};
use tf_04_transport::{FilingTransport, StatusReport, SubmissionReceipt, TransportError, TransportStatus};
use tf_05_error_classifier::RetryPolicy;
use tf_06_status_tracker::{ManualClock, SweepReport};
use tf_07_confirmation::{ReceiptSignatureVerifier, RsaReceiptVerifier};

pub const SIGNER_KEY_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/signer_key.pem"));
pub const AUTHORITY_KEY_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/authority_key.pem"));
pub const AUTHORITY_PUB_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/authority_pub.pem"));
pub const STRANGER_KEY_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/stranger_key.pem"));

pub const NUMBER: &str = "AB12CD34EF56GH78IJ90KL12MN34OP56";
pub const ISSUER: &str = "E2E Test CA";

// =============================================================================
// SCRIPTED AUTHORITY
// =============================================================================

/// Replays queued answers and records every document and poll it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    submits: Mutex<VecDeque<Result<SubmissionReceipt, TransportError>>>,
    polls: Mutex<VecDeque<Result<StatusReport, TransportError>>>,
    submitted: Mutex<Vec<String>>,
    polled: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn push_submit(&self, answer: Result<SubmissionReceipt, TransportError>) {
        self.submits.lock().push_back(answer);
    }

    pub fn push_poll(&self, answer: Result<StatusReport, TransportError>) {
        self.polls.lock().push_back(answer);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    pub fn polled(&self) -> Vec<String> {
        self.polled.lock().clone()
    }
}

#[async_trait]
impl FilingTransport for ScriptedTransport {
    async fn submit(&self, signed_document: &str) -> Result<SubmissionReceipt, TransportError> {
        self.submitted.lock().push(signed_document.to_string());
        self.submits
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
    }

    async fn check_status(&self, confirmation_number: &str) -> Result<StatusReport, TransportError> {
        self.polled.lock().push(confirmation_number.to_string());
        self.polls
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
    }

    async fn probe_connectivity(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

pub fn queued(number: &str) -> SubmissionReceipt {
    SubmissionReceipt {
        confirmation_number: number.into(),
        confirmation_date: None,
        status: TransportStatus::Submitted,
        status_code: 300,
        message: Some("document queued".into()),
    }
}

pub fn status(number: &str, status: TransportStatus, code: u16, receipt: Option<String>) -> StatusReport {
    StatusReport {
        confirmation_number: number.into(),
        status,
        status_code: code,
        status_description: status.as_str().into(),
        processing_date: None,
        receipt,
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

fn sale(number: &str, day: u32, net: i64, tax: i64) -> LedgerRow {
    LedgerRow {
        document_number: number.into(),
        issue_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        counterparty_id: "5260250274".into(),
        counterparty_name: "Buyer".into(),
        net_amount: Money::from_whole(net),
        tax_amount: Money::from_whole(tax),
    }
}

pub fn march() -> ReportingPeriod {
    ReportingPeriod::month(2024, 3).unwrap()
}

/// Monthly VAT ledger for March 2024 with two sales.
pub fn ledger() -> FilingInput {
    let mut calculation = CalculationData::new(
        DeclarationType::VatLedger,
        march(),
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
    )
    .with_amount(AmountField::OutputTax, Money::from_whole(276))
    .with_amount(AmountField::InputTax, Money::from_whole(115));
    calculation.sales_rows = vec![sale("FV/1", 4, 700, 161), sale("FV/2", 9, 500, 115)];
    FilingInput {
        calculation,
        entity: EntityInfo {
            taxpayer_id: "1234567890".into(),
            full_name: "Acme".into(),
            email: Some("tax@acme.test".into()),
            tax_office_code: "1471".into(),
        },
    }
}

/// Receipt for the March ledger, split around where the signature goes.
fn receipt_parts(number: &str, at: DateTime<Utc>) -> (String, String) {
    let head = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Receipt xmlns=\"urn:tax-authority:schemas:receipt:1\">\n  \
         <Header>\n    \
         <FormCode>JPK_V7M</FormCode>\n    \
         <TaxOfficeCode>1471</TaxOfficeCode>\n    \
         <Period>2024-03</Period>\n    \
         <TaxpayerId>1234567890</TaxpayerId>\n  \
         </Header>\n  \
         <ConfirmationBlock>\n    \
         <ConfirmationNumber>{number}</ConfirmationNumber>\n    \
         <ConfirmationDate>{}</ConfirmationDate>\n    \
         <StatusCode>200</StatusCode>\n    ",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    (head, "\n  </ConfirmationBlock>\n</Receipt>\n".to_string())
}

/// Receipt signed with `key_pem` over its text without the signature element.
pub fn signed_receipt(number: &str, key_pem: &str) -> String {
    let (head, tail) = receipt_parts(number, Utc::now());
    let key = RsaPrivateKey::from_pkcs8_pem(key_pem).unwrap();
    let signature = SigningKey::<Sha256>::new(key).sign(format!("{head}{tail}").as_bytes());
    format!(
        "{head}<Signature>{}</Signature>{tail}",
        BASE64.encode(signature.to_bytes())
    )
}

/// Self-signed certificate over the signer key, issued by [`ISSUER`].
pub fn signer_certificate_pem() -> String {
    let key = KeyPair::from_pem(SIGNER_KEY_PEM).unwrap();
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, ISSUER);
    params.self_signed(&key).unwrap().pem()
}

// =============================================================================
// WIRED CONTAINER
// =============================================================================

/// Container over a scripted authority and a manual clock. Local-certificate
/// signing is the configured strategy; receipts are verified against the
/// authority fixture key.
pub struct Harness {
    pub container: FilingContainer,
    pub transport: Arc<ScriptedTransport>,
    pub clock: Arc<ManualClock>,
    pub totals: Arc<InMemoryTotalsSource>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy {
            base_delay: std::time::Duration::from_secs(60),
            max_delay: std::time::Duration::from_secs(3600),
            max_retries: 3,
            jitter_ratio: 0.0,
        })
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        let mut config = FilingConfig::default();
        config.authority.endpoint = "https://authority.test/filing".into();
        config.signing.allowed_issuers = vec![ISSUER.into()];
        config.retry = retry;

        let transport = Arc::new(ScriptedTransport::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let local = LocalCertificateStrategy::from_pem(
            SIGNER_KEY_PEM,
            signer_certificate_pem().as_bytes(),
            TrustPolicy::new([ISSUER]),
        )
        .unwrap();
        let strategies: Vec<Arc<dyn SignatureStrategy>> = vec![Arc::new(UnsignedStrategy), Arc::new(local)];
        let verifier: Arc<dyn ReceiptSignatureVerifier> =
            Arc::new(RsaReceiptVerifier::from_public_key_pem(AUTHORITY_PUB_PEM).unwrap());

        let container = FilingContainer::assemble(
            config,
            transport.clone(),
            strategies,
            Some(verifier),
            clock.clone(),
        );
        let totals = Arc::new(InMemoryTotalsSource::new());
        totals.insert(ledger());

        Self {
            container,
            transport,
            clock,
            totals,
        }
    }

    pub fn pipeline(&self) -> FilingPipeline {
        self.container.pipeline(self.totals.clone())
    }

    /// The March ledger with the configured signing strategy.
    pub fn request(&self) -> FilingRequest {
        FilingRequest::new(DeclarationType::VatLedger, march(), self.container.signature_config())
    }

    /// One scheduler tick at the current manual time.
    pub async fn sweep(&self) -> SweepReport {
        self.container.scheduler().tick().await
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.clock.advance(by);
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
