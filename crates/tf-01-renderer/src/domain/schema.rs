//! # Schema Catalogue
//!
//! One schema per declaration type. Each schema fixes the root element, the
//! namespace and the ordered list of sections and fields. The renderer emits
//! exactly this layout; the validator checks documents against it.

use serde::{Deserialize, Serialize};
use shared_types::{DeclarationType, Variant};

/// Namespace of the ledger-style declaration.
pub const VAT_LEDGER_NAMESPACE: &str = "urn:tax-authority:schemas:vat-ledger:2";
/// Namespace of the single-section return.
pub const VAT_RETURN_NAMESPACE: &str = "urn:tax-authority:schemas:vat-return:1";

/// Name of the ledger section and its child elements.
pub const LEDGER_SECTION: &str = "Ledger";

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Whole currency units; may not be negative.
    Amount,
    /// `YYYY-MM-DD`.
    Date,
}

/// When a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
    MonthlyOnly,
    QuarterlyOnly,
}

impl Requirement {
    /// Whether the field must be present for `variant`.
    pub fn required_for(&self, variant: Variant) -> bool {
        match self {
            Self::Required => true,
            Self::Optional => false,
            Self::MonthlyOnly => variant == Variant::Monthly,
            Self::QuarterlyOnly => variant == Variant::Quarterly,
        }
    }

    /// Whether the field belongs in a document of `variant` at all.
    pub fn applies_to(&self, variant: Variant) -> bool {
        match self {
            Self::Required | Self::Optional => true,
            Self::MonthlyOnly => variant == Variant::Monthly,
            Self::QuarterlyOnly => variant == Variant::Quarterly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub name: &'static str,
    pub required: bool,
    pub fields: &'static [FieldSpec],
}

/// Declared monetary fields, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmountField {
    DomesticSalesNet,
    OutputTax,
    ExportSalesNet,
    IntraCommunitySupplyNet,
    ReverseChargeNet,
    PurchaseNet,
    InputTax,
    FixedAssetPurchaseNet,
    AmountDue,
    Surplus,
}

impl AmountField {
    pub const ALL: [AmountField; 10] = [
        Self::DomesticSalesNet,
        Self::OutputTax,
        Self::ExportSalesNet,
        Self::IntraCommunitySupplyNet,
        Self::ReverseChargeNet,
        Self::PurchaseNet,
        Self::InputTax,
        Self::FixedAssetPurchaseNet,
        Self::AmountDue,
        Self::Surplus,
    ];

    pub fn element_name(&self) -> &'static str {
        match self {
            Self::DomesticSalesNet => "DomesticSalesNet",
            Self::OutputTax => "OutputTax",
            Self::ExportSalesNet => "ExportSalesNet",
            Self::IntraCommunitySupplyNet => "IntraCommunitySupplyNet",
            Self::ReverseChargeNet => "ReverseChargeNet",
            Self::PurchaseNet => "PurchaseNet",
            Self::InputTax => "InputTax",
            Self::FixedAssetPurchaseNet => "FixedAssetPurchaseNet",
            Self::AmountDue => "AmountDue",
            Self::Surplus => "Surplus",
        }
    }

    /// Derived by the renderer rather than supplied by the caller.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::AmountDue | Self::Surplus)
    }
}

const fn field(name: &'static str, kind: FieldKind, requirement: Requirement) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        requirement,
    }
}

const HEADER_FIELDS: &[FieldSpec] = &[
    field("FormCode", FieldKind::Text, Requirement::Required),
    field("Purpose", FieldKind::Integer, Requirement::Required),
    field("PreparedOn", FieldKind::Date, Requirement::Required),
    field("TaxOfficeCode", FieldKind::Text, Requirement::Required),
    field("Year", FieldKind::Integer, Requirement::Required),
    field("Month", FieldKind::Integer, Requirement::MonthlyOnly),
    field("Quarter", FieldKind::Integer, Requirement::QuarterlyOnly),
    field("PeriodToken", FieldKind::Text, Requirement::Required),
];

const SUBJECT_FIELDS: &[FieldSpec] = &[
    field("TaxpayerId", FieldKind::Text, Requirement::Required),
    field("FullName", FieldKind::Text, Requirement::Required),
    field("Email", FieldKind::Text, Requirement::Optional),
];

const AMOUNT_FIELDS: &[FieldSpec] = &[
    field("DomesticSalesNet", FieldKind::Amount, Requirement::Required),
    field("OutputTax", FieldKind::Amount, Requirement::Required),
    field("ExportSalesNet", FieldKind::Amount, Requirement::Required),
    field("IntraCommunitySupplyNet", FieldKind::Amount, Requirement::Required),
    field("ReverseChargeNet", FieldKind::Amount, Requirement::Required),
    field("PurchaseNet", FieldKind::Amount, Requirement::Required),
    field("InputTax", FieldKind::Amount, Requirement::Required),
    field("FixedAssetPurchaseNet", FieldKind::Amount, Requirement::Required),
    field("AmountDue", FieldKind::Amount, Requirement::Required),
    field("Surplus", FieldKind::Amount, Requirement::Required),
];

/// Fields of one ledger row, in document order.
pub const LEDGER_ROW_FIELDS: &[FieldSpec] = &[
    field("Ordinal", FieldKind::Integer, Requirement::Required),
    field("DocumentNumber", FieldKind::Text, Requirement::Required),
    field("IssueDate", FieldKind::Date, Requirement::Required),
    field("CounterpartyId", FieldKind::Text, Requirement::Required),
    field("CounterpartyName", FieldKind::Text, Requirement::Required),
    field("NetAmount", FieldKind::Amount, Requirement::Required),
    field("TaxAmount", FieldKind::Amount, Requirement::Required),
];

const HEADER: SectionSpec = SectionSpec {
    name: "Header",
    required: true,
    fields: HEADER_FIELDS,
};

const SUBJECT: SectionSpec = SectionSpec {
    name: "Subject",
    required: true,
    fields: SUBJECT_FIELDS,
};

const DECLARATION_FIELDS: SectionSpec = SectionSpec {
    name: "DeclarationFields",
    required: true,
    fields: AMOUNT_FIELDS,
};

/// Row-structured; its content is checked by the ledger rules, not field by field.
const LEDGER: SectionSpec = SectionSpec {
    name: LEDGER_SECTION,
    required: false,
    fields: &[],
};

/// Schema of one declaration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub declaration_type: DeclarationType,
    pub root_element: &'static str,
    pub namespace: &'static str,
    pub sections: &'static [SectionSpec],
    /// Whether ledger rows may be included.
    pub has_ledger: bool,
}

const VAT_LEDGER_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    declaration_type: DeclarationType::VatLedger,
    root_element: "VatLedgerDeclaration",
    namespace: VAT_LEDGER_NAMESPACE,
    sections: &[HEADER, SUBJECT, DECLARATION_FIELDS, LEDGER],
    has_ledger: true,
};

const VAT_RETURN_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    declaration_type: DeclarationType::VatReturn,
    root_element: "VatReturn",
    namespace: VAT_RETURN_NAMESPACE,
    sections: &[HEADER, SUBJECT, DECLARATION_FIELDS],
    has_ledger: false,
};

/// Every known schema.
pub static SCHEMAS: [SchemaDescriptor; 2] = [VAT_LEDGER_SCHEMA, VAT_RETURN_SCHEMA];

/// Schema for a declaration type.
pub fn schema_for(declaration_type: DeclarationType) -> &'static SchemaDescriptor {
    match declaration_type {
        DeclarationType::VatLedger => &VAT_LEDGER_SCHEMA,
        DeclarationType::VatReturn => &VAT_RETURN_SCHEMA,
    }
}

/// Schema whose root element is `root`.
pub fn schema_by_root(root: &str) -> Option<&'static SchemaDescriptor> {
    SCHEMAS
        .iter()
        .find(|schema| schema.root_element == root)
}

impl SchemaDescriptor {
    pub fn section(&self, name: &str) -> Option<&'static SectionSpec> {
        self.sections.iter().find(|section| section.name == name)
    }
}
