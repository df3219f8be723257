//! # Runtime Ports
//!
//! Collaborators the runtime needs but does not implement. Totals are
//! computed elsewhere; the pipeline only reads them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{DeclarationType, ReportingPeriod};
use tf_01_renderer::{CalculationData, EntityInfo};
use thiserror::Error;

/// Everything the renderer needs for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingInput {
    pub calculation: CalculationData,
    pub entity: EntityInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("No totals for {declaration_type} {period}")]
    NotFound {
        declaration_type: DeclarationType,
        period: ReportingPeriod,
    },

    /// The source answered with totals for another declaration.
    #[error("Totals are for {found}, expected {expected}")]
    Mismatch { expected: String, found: String },

    #[error("Totals are malformed: {0}")]
    Malformed(String),

    #[error("Totals source unavailable: {0}")]
    Unavailable(String),
}

/// Source of computed totals and entity identity.
#[async_trait]
pub trait TotalsSource: Send + Sync {
    async fn totals(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
    ) -> Result<FilingInput, TotalsError>;
}
