//! Totals source adapters.
//!
//! - `InMemoryTotalsSource`: preloaded map, for tests and replays
//! - `JsonTotalsSource`: one JSON document per declaration in a directory,
//!   named `{declaration-type}-{period}.json` (e.g. `vat-return-2024-03.json`)

use crate::ports::{FilingInput, TotalsError, TotalsSource};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DeclarationType, ReportingPeriod};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryTotalsSource {
    inputs: RwLock<HashMap<(DeclarationType, ReportingPeriod), FilingInput>>,
}

impl InMemoryTotalsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `input` under its own type and period.
    pub fn insert(&self, input: FilingInput) {
        let key = (input.calculation.declaration_type, input.calculation.period);
        self.inputs.write().insert(key, input);
    }
}

#[async_trait]
impl TotalsSource for InMemoryTotalsSource {
    async fn totals(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
    ) -> Result<FilingInput, TotalsError> {
        self.inputs
            .read()
            .get(&(declaration_type, period))
            .cloned()
            .ok_or(TotalsError::NotFound {
                declaration_type,
                period,
            })
    }
}

#[derive(Debug, Clone)]
pub struct JsonTotalsSource {
    dir: PathBuf,
}

impl JsonTotalsSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, declaration_type: DeclarationType, period: ReportingPeriod) -> PathBuf {
        self.dir.join(format!("{declaration_type}-{period}.json"))
    }
}

#[async_trait]
impl TotalsSource for JsonTotalsSource {
    async fn totals(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
    ) -> Result<FilingInput, TotalsError> {
        let path = self.path_for(declaration_type, period);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TotalsError::NotFound {
                    declaration_type,
                    period,
                })
            }
            Err(e) => return Err(TotalsError::Unavailable(format!("{}: {e}", path.display()))),
        };

        let input: FilingInput =
            serde_json::from_str(&raw).map_err(|e| TotalsError::Malformed(format!("{}: {e}", path.display())))?;

        let calculation = &input.calculation;
        if calculation.declaration_type != declaration_type || calculation.period != period {
            return Err(TotalsError::Mismatch {
                expected: format!("{declaration_type} {period}"),
                found: format!("{} {}", calculation.declaration_type, calculation.period),
            });
        }

        debug!(path = %path.display(), "Totals loaded");
        Ok(input)
    }
}
