//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{CalculationData, EntityInfo, RenderedDocument};
use crate::domain::errors::RenderError;
use shared_types::Variant;

/// Primary renderer API.
///
/// Implementations must be deterministic: the same inputs always yield the
/// same bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        data: &CalculationData,
        entity: &EntityInfo,
        variant: Variant,
    ) -> Result<RenderedDocument, RenderError>;
}
