//! # Pipeline Benchmarks
//!
//! | Stage | Work |
//! |-------|------|
//! | tf-01 Renderer | ledger with N sales rows to XML |
//! | tf-02 Validator | three passes over the rendered document |
//! | tf-03 Signature | RSA-SHA256 enveloped signature |
//! | tf-07 Confirmation | receipt parse, checks and signature verify |

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use filing_runtime::FilingInput;
use shared_types::{DeclarationId, FormCode, Money, SignatureType, Variant};
use tf_01_renderer::{DocumentRenderer, LedgerRow, RendererService};
use tf_02_validator::{DocumentValidator, ValidationPolicy, ValidatorService};
use tf_03_signature::{
    InMemorySignatureRecordStore, LocalCertificateStrategy, SignatureEngine, SignatureEngineApi,
    StrategyConfig, TrustPolicy,
};
use tf_07_confirmation::{
    ConfirmationPolicy, ConfirmationValidator, ConfirmationValidatorApi, ExpectedDeclaration,
    InMemoryConfirmationStore, RsaReceiptVerifier,
};
use tf_tests::integration::fixtures::{
    ledger, march, signed_receipt, signer_certificate_pem, AUTHORITY_KEY_PEM, AUTHORITY_PUB_PEM,
    ISSUER, NUMBER, SIGNER_KEY_PEM,
};

/// The fixture ledger padded to `rows` sales rows.
fn ledger_with_rows(rows: usize) -> FilingInput {
    let mut input = ledger();
    input.calculation.sales_rows = (0..rows)
        .map(|i| LedgerRow {
            document_number: format!("FV/{i}"),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1 + (i % 28) as u32).unwrap(),
            counterparty_id: "5260250274".into(),
            counterparty_name: "Buyer".into(),
            net_amount: Money::from_whole(100),
            tax_amount: Money::from_whole(23),
        })
        .collect();
    input
}

fn bench_render_and_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tf-01-02-render-validate");
    group.measurement_time(Duration::from_secs(10));

    let renderer = RendererService::new();
    let validator = ValidatorService::new(ValidationPolicy::default());

    for rows in [2usize, 100, 1_000] {
        let input = ledger_with_rows(rows);
        let rendered = renderer
            .render(&input.calculation, &input.entity, Variant::Monthly)
            .unwrap();

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("render", rows), &input, |b, input| {
            b.iter(|| {
                black_box(
                    renderer
                        .render(&input.calculation, &input.entity, Variant::Monthly)
                        .unwrap(),
                )
            })
        });
        group.bench_with_input(
            BenchmarkId::new("validate", rows),
            &rendered.content,
            |b, content| b.iter(|| black_box(validator.validate(content, Variant::Monthly))),
        );
    }

    group.finish();
}

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("tf-03-signature");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let strategy = LocalCertificateStrategy::from_pem(
        SIGNER_KEY_PEM,
        signer_certificate_pem().as_bytes(),
        TrustPolicy::new([ISSUER]),
    )
    .unwrap();
    let engine = SignatureEngine::new(Arc::new(InMemorySignatureRecordStore::new()), false)
        .with_strategy(Arc::new(strategy));
    let config = StrategyConfig::new(SignatureType::LocalCertificate);

    let input = ledger();
    let document = RendererService::new()
        .render(&input.calculation, &input.entity, Variant::Monthly)
        .unwrap()
        .content;

    group.bench_function("local_certificate_sign", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(
                    engine
                        .sign(&document, DeclarationId::new(), &config)
                        .await
                        .unwrap(),
                )
            })
        })
    });

    group.finish();
}

fn bench_receipt_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tf-07-confirmation");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let receipt = signed_receipt(NUMBER, AUTHORITY_KEY_PEM);
    let expected = ExpectedDeclaration {
        declaration_id: DeclarationId::new(),
        form_code: FormCode::JpkV7m,
        period: march(),
        confirmation_number: Some(NUMBER.into()),
    };

    group.bench_function("validate_and_store_signed", |b| {
        b.iter(|| {
            // Fresh store each round so every iteration takes the insert path.
            let validator = ConfirmationValidator::new(
                Arc::new(InMemoryConfirmationStore::new()),
                ConfirmationPolicy::default(),
            )
            .with_verifier(Arc::new(
                RsaReceiptVerifier::from_public_key_pem(AUTHORITY_PUB_PEM).unwrap(),
            ));
            runtime.block_on(async {
                black_box(validator.validate_and_store(&receipt, &expected).await.unwrap())
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_render_and_validate,
    bench_signing,
    bench_receipt_validation,
);

criterion_main!(benches);
