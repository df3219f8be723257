//! # Renderer Service
//!
//! Implements the `DocumentRenderer` port over the pure domain function.

use crate::domain::entities::{CalculationData, EntityInfo, RenderedDocument};
use crate::domain::errors::RenderError;
use crate::domain::render;
use crate::ports::inbound::DocumentRenderer;
use shared_types::Variant;
use tracing::{debug, warn};

/// Stateless renderer service.
#[derive(Debug, Default, Clone, Copy)]
pub struct RendererService;

impl RendererService {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for RendererService {
    fn render(
        &self,
        data: &CalculationData,
        entity: &EntityInfo,
        variant: Variant,
    ) -> Result<RenderedDocument, RenderError> {
        match render::render(data, entity, variant) {
            Ok(document) => {
                debug!(
                    form_code = %document.form_code,
                    period = %data.period,
                    bytes = document.content.len(),
                    "Document rendered"
                );
                Ok(document)
            }
            Err(e) => {
                warn!(period = %data.period, error = %e, "Rendering rejected input");
                Err(e)
            }
        }
    }
}
