//! # Renderer Entities
//!
//! Inputs and output of the renderer. Totals arrive already computed; the
//! renderer never performs tax arithmetic beyond deriving the amount due and
//! the surplus.

use crate::domain::schema::AmountField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{DeclarationType, FormCode, Money, ReportingPeriod, Variant};
use std::collections::BTreeMap;

/// Why the declaration is being filed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    #[default]
    Original,
    Correction,
}

impl Purpose {
    /// Numeric code written into the header.
    pub fn code(&self) -> u8 {
        match self {
            Self::Original => 1,
            Self::Correction => 2,
        }
    }
}

/// One sales or purchase entry of the itemised ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub document_number: String,
    pub issue_date: NaiveDate,
    pub counterparty_id: String,
    pub counterparty_name: String,
    pub net_amount: Money,
    pub tax_amount: Money,
}

/// Computed totals for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationData {
    pub declaration_type: DeclarationType,
    pub period: ReportingPeriod,
    /// Preparation date written into the header. Never taken from the clock.
    pub prepared_on: NaiveDate,
    pub purpose: Purpose,
    /// Supplied amounts. Absent fields render as `0`; `AmountDue` and
    /// `Surplus` are ignored here and always derived.
    pub amounts: BTreeMap<AmountField, Money>,
    pub sales_rows: Vec<LedgerRow>,
    pub purchase_rows: Vec<LedgerRow>,
}

impl CalculationData {
    pub fn new(
        declaration_type: DeclarationType,
        period: ReportingPeriod,
        prepared_on: NaiveDate,
    ) -> Self {
        Self {
            declaration_type,
            period,
            prepared_on,
            purpose: Purpose::Original,
            amounts: BTreeMap::new(),
            sales_rows: Vec::new(),
            purchase_rows: Vec::new(),
        }
    }

    /// Builder-style setter for one amount.
    pub fn with_amount(mut self, field: AmountField, value: Money) -> Self {
        self.amounts.insert(field, value);
        self
    }

    pub fn amount(&self, field: AmountField) -> Money {
        self.amounts.get(&field).copied().unwrap_or(Money::ZERO)
    }
}

/// Identity of the filing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub taxpayer_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub tax_office_code: String,
}

/// A rendered, unsigned declaration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub content: String,
    pub declaration_type: DeclarationType,
    pub variant: Variant,
    pub form_code: FormCode,
}
