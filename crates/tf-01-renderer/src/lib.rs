//! # Declaration Renderer (TF-01)
//!
//! Turns computed tax totals and entity metadata into the authority-defined
//! XML document for a declaration type and variant.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Schema catalogue, XML writer, pure `render`
//! - **Ports Layer** (`ports/`): `DocumentRenderer` inbound API
//! - **Service Layer** (`service.rs`): Logging wrapper implementing the port
//!
//! ## Rules
//!
//! - Output is deterministic; the preparation date comes from the input.
//! - Amounts are whole units, rounded half away from zero; absent ones are `0`.
//! - `AmountDue = max(OutputTax - InputTax, 0)`, `Surplus = max(InputTax - OutputTax, 0)`.
//! - Ledger rows are numbered from 1 in input order.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::{CalculationData, EntityInfo, LedgerRow, Purpose, RenderedDocument};
pub use domain::errors::{LedgerKind, RenderError};
pub use domain::render::{render, DATE_FORMAT};
pub use domain::schema::{schema_by_root, schema_for, AmountField, SchemaDescriptor};
pub use ports::inbound::DocumentRenderer;
pub use service::RendererService;
