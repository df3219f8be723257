//! # Document Rendering
//!
//! `render` is a pure function: identical inputs produce byte-identical
//! output. Signatures are computed over these exact bytes, and a retry must
//! resend the same payload.

use crate::domain::entities::{CalculationData, EntityInfo, LedgerRow, RenderedDocument};
use crate::domain::errors::{LedgerKind, RenderError};
use crate::domain::schema::{schema_for, AmountField, LEDGER_SECTION};
use crate::domain::xml::XmlWriter;
use shared_types::ids::{is_valid_tax_office_code, taxpayer_id_kind};
use shared_types::{Money, PeriodUnit, Variant};

/// Date format used for every date in the document.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a declaration document.
pub fn render(
    data: &CalculationData,
    entity: &EntityInfo,
    variant: Variant,
) -> Result<RenderedDocument, RenderError> {
    check_entity(entity)?;
    check_period(data, variant)?;

    let schema = schema_for(data.declaration_type);
    let has_rows = !data.sales_rows.is_empty() || !data.purchase_rows.is_empty();
    if has_rows && !schema.has_ledger {
        return Err(RenderError::LedgerNotSupported(data.declaration_type));
    }
    check_rows(LedgerKind::Sales, &data.sales_rows)?;
    check_rows(LedgerKind::Purchase, &data.purchase_rows)?;

    let form_code = data.declaration_type.form_code(variant);
    let mut w = XmlWriter::new();
    w.open_root(schema.root_element, schema.namespace);

    w.open("Header");
    w.leaf("FormCode", form_code.as_str());
    w.leaf("Purpose", data.purpose.code());
    w.leaf("PreparedOn", data.prepared_on.format(DATE_FORMAT));
    w.leaf("TaxOfficeCode", entity.tax_office_code.trim());
    w.leaf("Year", data.period.year());
    match data.period.unit() {
        PeriodUnit::Month(m) => w.leaf("Month", m),
        PeriodUnit::Quarter(q) => w.leaf("Quarter", q),
    }
    w.leaf("PeriodToken", data.period.token());
    w.close("Header");

    w.open("Subject");
    w.leaf("TaxpayerId", entity.taxpayer_id.trim());
    w.leaf("FullName", entity.full_name.trim());
    if let Some(email) = entity.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        w.leaf("Email", email);
    }
    w.close("Subject");

    let (due, surplus) = settle(data);
    w.open("DeclarationFields");
    for field in AmountField::ALL {
        let value = match field {
            AmountField::AmountDue => due,
            AmountField::Surplus => surplus,
            other => data.amount(other).whole_units(),
        };
        w.leaf(field.element_name(), value);
    }
    w.close("DeclarationFields");

    if has_rows {
        w.open(LEDGER_SECTION);
        write_ledger(&mut w, "Sales", &data.sales_rows);
        write_ledger(&mut w, "Purchase", &data.purchase_rows);
        w.close(LEDGER_SECTION);
    }

    w.close(schema.root_element);

    Ok(RenderedDocument {
        content: w.finish(),
        declaration_type: data.declaration_type,
        variant,
        form_code,
    })
}

/// `(amount due, surplus)` in whole units, from the rounded output and input tax.
pub fn settle(data: &CalculationData) -> (i64, i64) {
    let output = data.amount(AmountField::OutputTax).whole_units();
    let input = data.amount(AmountField::InputTax).whole_units();
    ((output - input).max(0), (input - output).max(0))
}

fn check_entity(entity: &EntityInfo) -> Result<(), RenderError> {
    let taxpayer_id = entity.taxpayer_id.trim();
    if taxpayer_id.is_empty() {
        return Err(RenderError::MissingField("TaxpayerId"));
    }
    if taxpayer_id_kind(taxpayer_id).is_none() {
        return Err(RenderError::InvalidTaxpayerId(taxpayer_id.to_string()));
    }
    if entity.full_name.trim().is_empty() {
        return Err(RenderError::MissingField("FullName"));
    }
    let office = entity.tax_office_code.trim();
    if office.is_empty() {
        return Err(RenderError::MissingField("TaxOfficeCode"));
    }
    if !is_valid_tax_office_code(office) {
        return Err(RenderError::InvalidTaxOfficeCode(office.to_string()));
    }
    Ok(())
}

fn check_period(data: &CalculationData, variant: Variant) -> Result<(), RenderError> {
    if data.period.variant() != variant {
        return Err(RenderError::PeriodVariantMismatch {
            period: data.period.to_string(),
            variant,
        });
    }
    Ok(())
}

fn check_rows(ledger: LedgerKind, rows: &[LedgerRow]) -> Result<(), RenderError> {
    for (index, row) in rows.iter().enumerate() {
        let invalid = |reason| RenderError::InvalidLedgerRow {
            ledger,
            row: index + 1,
            reason,
        };
        if row.document_number.trim().is_empty() {
            return Err(invalid("missing document number"));
        }
        if row.counterparty_id.trim().is_empty() {
            return Err(invalid("missing counterparty id"));
        }
        if row.counterparty_name.trim().is_empty() {
            return Err(invalid("missing counterparty name"));
        }
    }
    Ok(())
}

/// Rows numbered from 1 in input order, then the control block.
fn write_ledger(w: &mut XmlWriter, prefix: &str, rows: &[LedgerRow]) {
    if rows.is_empty() {
        return;
    }
    let row_element = format!("{prefix}Row");
    let mut tax_total = 0i64;
    for (index, row) in rows.iter().enumerate() {
        let tax = row.tax_amount.whole_units();
        tax_total += tax;
        w.open(&row_element);
        w.leaf("Ordinal", index + 1);
        w.leaf("DocumentNumber", row.document_number.trim());
        w.leaf("IssueDate", row.issue_date.format(DATE_FORMAT));
        w.leaf("CounterpartyId", row.counterparty_id.trim());
        w.leaf("CounterpartyName", row.counterparty_name.trim());
        w.leaf("NetAmount", row.net_amount.whole_units());
        w.leaf("TaxAmount", tax);
        w.close(&row_element);
    }
    let control = format!("{prefix}Control");
    w.open(&control);
    w.leaf("RowCount", rows.len());
    w.leaf("TaxTotal", tax_total);
    w.close(&control);
}

/// Sum of rendered tax amounts of a ledger, as the control block states it.
pub fn ledger_tax_total(rows: &[LedgerRow]) -> Money {
    Money::from_whole(rows.iter().map(|r| r.tax_amount.whole_units()).sum())
}
