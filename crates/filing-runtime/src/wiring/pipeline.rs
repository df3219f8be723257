//! # Filing Pipeline
//!
//! Drives one declaration from totals to submission:
//!
//! ```text
//! TotalsSource → render → attach → validate → mark_ready → sign → attach signed → submit
//! ```
//!
//! Validation and signing errors stop the pipeline before anything is sent.
//! The declaration keeps the state it reached (`draft` after a validation
//! failure, `ready` after a signing failure) so a caller can fix and retry.

use crate::ports::{TotalsError, TotalsSource};
use filing_telemetry::{metric_inc, DOCUMENTS_RENDERED, VALIDATION_FAILURES};
use serde::{Deserialize, Serialize};
use shared_bus::{EventPublisher, FilingEvent};
use shared_types::{Declaration, DeclarationId, DeclarationType, ReportingPeriod, Variant};
use std::sync::Arc;
use tf_01_renderer::{DocumentRenderer, RenderError};
use tf_02_validator::{DocumentValidator, ValidationReport};
use tf_03_signature::{SignatureEngineApi, SignatureError, StrategyConfig};
use tf_06_status_tracker::{StatusTrackerApi, TrackerError};
use thiserror::Error;
use tracing::{info, warn};

/// One filing to prepare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRequest {
    pub declaration_type: DeclarationType,
    pub period: ReportingPeriod,
    pub variant: Variant,
    pub signature: StrategyConfig,
}

impl FilingRequest {
    /// Variant follows from the period (monthly or quarterly).
    pub fn new(declaration_type: DeclarationType, period: ReportingPeriod, signature: StrategyConfig) -> Self {
        Self {
            declaration_type,
            period,
            variant: period.variant(),
            signature,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Totals(#[from] TotalsError),

    #[error("Declaration {declaration_id} could not be rendered: {source}")]
    Render {
        declaration_id: DeclarationId,
        source: RenderError,
    },

    #[error("Declaration {declaration_id} failed validation: {}", .report.error_summary().join("; "))]
    Invalid {
        declaration_id: DeclarationId,
        report: ValidationReport,
    },

    #[error("Declaration {declaration_id} could not be signed: {source}")]
    Signature {
        declaration_id: DeclarationId,
        source: SignatureError,
    },

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl PipelineError {
    /// The declaration the failure belongs to, once one exists.
    pub fn declaration_id(&self) -> Option<DeclarationId> {
        match self {
            Self::Render { declaration_id, .. }
            | Self::Invalid { declaration_id, .. }
            | Self::Signature { declaration_id, .. } => Some(*declaration_id),
            Self::Totals(_) | Self::Tracker(_) => None,
        }
    }
}

pub struct FilingPipeline {
    totals: Arc<dyn TotalsSource>,
    renderer: Arc<dyn DocumentRenderer>,
    validator: Arc<dyn DocumentValidator>,
    signer: Arc<dyn SignatureEngineApi>,
    tracker: Arc<dyn StatusTrackerApi>,
    publisher: Arc<dyn EventPublisher>,
}

impl FilingPipeline {
    pub fn new(
        totals: Arc<dyn TotalsSource>,
        renderer: Arc<dyn DocumentRenderer>,
        validator: Arc<dyn DocumentValidator>,
        signer: Arc<dyn SignatureEngineApi>,
        tracker: Arc<dyn StatusTrackerApi>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            totals,
            renderer,
            validator,
            signer,
            tracker,
            publisher,
        }
    }

    /// Create, render, validate and sign a declaration. Nothing is sent.
    pub async fn prepare(&self, request: &FilingRequest) -> Result<Declaration, PipelineError> {
        let input = self
            .totals
            .totals(request.declaration_type, request.period)
            .await?;

        let declaration = self
            .tracker
            .create(request.declaration_type, request.period, request.variant)
            .await?;
        let id = declaration.id;

        let rendered = self
            .renderer
            .render(&input.calculation, &input.entity, request.variant)
            .map_err(|source| PipelineError::Render {
                declaration_id: id,
                source,
            })?;
        self.tracker
            .attach_document(id, rendered.content.clone())
            .await?;
        metric_inc!(DOCUMENTS_RENDERED, &[rendered.form_code.as_str()]);
        self.publisher
            .publish(FilingEvent::DocumentRendered {
                declaration_id: id,
                form_code: rendered.form_code,
                size: rendered.content.len(),
            })
            .await;

        let report = self.validator.validate(&rendered.content, request.variant);
        if !report.is_valid {
            for issue in &report.errors {
                metric_inc!(VALIDATION_FAILURES, &[issue.pass.as_str()]);
            }
            warn!(
                declaration_id = %id,
                errors = report.errors.len(),
                "Document failed validation, declaration stays in draft"
            );
            return Err(PipelineError::Invalid {
                declaration_id: id,
                report,
            });
        }
        let reason = if report.warnings.is_empty() {
            "validation passed".to_string()
        } else {
            format!("validation passed with {} warning(s)", report.warnings.len())
        };
        self.tracker.mark_ready(id, &reason).await?;
        self.publisher
            .publish(FilingEvent::DeclarationReady {
                declaration_id: id,
                warnings: report.warnings.len(),
            })
            .await;

        let signed = self
            .signer
            .sign(&rendered.content, id, &request.signature)
            .await
            .map_err(|source| PipelineError::Signature {
                declaration_id: id,
                source,
            })?;
        let declaration = self
            .tracker
            .attach_signed_document(id, signed.content, signed.signature_type)
            .await?;
        self.publisher
            .publish(FilingEvent::DocumentSigned {
                declaration_id: id,
                signature_id: signed.signature_id,
                signature_type: signed.signature_type,
            })
            .await;

        info!(
            declaration_id = %id,
            form_code = %declaration.form_code(),
            period = %declaration.period,
            "Declaration prepared"
        );
        Ok(declaration)
    }

    /// `prepare`, then submit. Transport failures do not fail this call;
    /// they are recorded on the returned declaration.
    pub async fn file(&self, request: &FilingRequest) -> Result<Declaration, PipelineError> {
        let prepared = self.prepare(request).await?;
        Ok(self.tracker.submit(prepared.id).await?)
    }
}
