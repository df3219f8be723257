//! # Pass 3: Business Rules
//!
//! Cross-field arithmetic, identifier checksums, sign of amounts, date sanity
//! and ledger control totals. Values that are absent or non-numeric were
//! already reported by the schema pass and are skipped here.

use crate::domain::entities::{ValidationPass, ValidationPolicy, ValidationReport};
use crate::domain::schema_pass::LEDGER_PREFIXES;
use crate::domain::tree::{child, child_number, child_text, children, text};
use chrono::{DateTime, NaiveDate, Utc};
use roxmltree::Node;
use shared_types::ids::{is_valid_tax_office_code, is_valid_taxpayer_id};
use tf_01_renderer::domain::render::DATE_FORMAT;
use tf_01_renderer::domain::schema::{AmountField, SchemaDescriptor, LEDGER_SECTION};

const PASS: ValidationPass = ValidationPass::BusinessRule;

/// Row amounts are whole units; control totals must match exactly.
const LEDGER_TOLERANCE: f64 = 1e-6;

pub fn check_business_rules(
    root: Node<'_, '_>,
    schema: &SchemaDescriptor,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
    report: &mut ValidationReport,
) {
    let root_path = format!("/{}", schema.root_element);

    if let Some(fields) = child(root, "DeclarationFields") {
        let path = format!("{root_path}/DeclarationFields");
        check_non_negative_amounts(fields, &path, report);
        check_reconciliation(fields, &path, policy.epsilon, report);
    }

    if let Some(subject) = child(root, "Subject") {
        if let Some(id) = child_text(subject, "TaxpayerId").filter(|id| !id.is_empty()) {
            if !is_valid_taxpayer_id(id) {
                report.error(
                    PASS,
                    "invalid-taxpayer-id",
                    format!("{root_path}/Subject/TaxpayerId"),
                    format!("taxpayer id {id} fails the checksum"),
                );
            }
        }
    }

    if let Some(header) = child(root, "Header") {
        let path = format!("{root_path}/Header");
        check_header(header, &path, policy, now, report);
    }

    if schema.has_ledger {
        if let Some(ledger) = child(root, LEDGER_SECTION) {
            check_ledger(ledger, &format!("{root_path}/{LEDGER_SECTION}"), report);
        }
    }
}

fn check_non_negative_amounts(fields: Node<'_, '_>, path: &str, report: &mut ValidationReport) {
    for field in AmountField::ALL {
        let name = field.element_name();
        if let Some(value) = child_number(fields, name) {
            if value < 0.0 {
                report.error(
                    PASS,
                    "negative-amount",
                    format!("{path}/{name}"),
                    format!("{name} must not be negative, found {value}"),
                );
            }
        }
    }
}

/// `AmountDue == max(OutputTax - InputTax, 0)` and
/// `Surplus == max(InputTax - OutputTax, 0)`, each within `epsilon`.
fn check_reconciliation(
    fields: Node<'_, '_>,
    path: &str,
    epsilon: f64,
    report: &mut ValidationReport,
) {
    let value = |field: AmountField| child_number(fields, field.element_name());
    let (Some(output), Some(input)) = (value(AmountField::OutputTax), value(AmountField::InputTax))
    else {
        return;
    };

    let checks = [
        (AmountField::AmountDue, "amount-due-mismatch", (output - input).max(0.0)),
        (AmountField::Surplus, "surplus-mismatch", (input - output).max(0.0)),
    ];
    for (field, code, expected) in checks {
        let Some(declared) = value(field) else {
            continue;
        };
        if (declared - expected).abs() > epsilon {
            let name = field.element_name();
            report.error(
                PASS,
                code,
                format!("{path}/{name}"),
                format!(
                    "{name} {declared} must be {expected} for OutputTax {output} and InputTax {input}"
                ),
            );
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn check_header(
    header: Node<'_, '_>,
    path: &str,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
    report: &mut ValidationReport,
) {
    if let Some(prepared) = child_text(header, "PreparedOn").filter(|v| !v.is_empty()) {
        match parse_date(prepared) {
            None => report.error(
                PASS,
                "invalid-date",
                format!("{path}/PreparedOn"),
                format!("{prepared:?} is not a YYYY-MM-DD date"),
            ),
            Some(date) => {
                let distance = (date - now.date_naive()).num_days().abs();
                if distance > policy.date_window_days {
                    report.warning(
                        PASS,
                        "date-out-of-window",
                        format!("{path}/PreparedOn"),
                        format!(
                            "{prepared} is {distance} days from today (window ±{} days)",
                            policy.date_window_days
                        ),
                    );
                }
            }
        }
    }

    if let Some(office) = child_text(header, "TaxOfficeCode").filter(|v| !v.is_empty()) {
        if !is_valid_tax_office_code(office) {
            report.error(
                PASS,
                "invalid-tax-office-code",
                format!("{path}/TaxOfficeCode"),
                format!("tax-office code must be 4 digits, found {office:?}"),
            );
        }
    }

    check_period(header, path, report);
}

/// Month/quarter within range and consistent with the period token.
fn check_period(header: Node<'_, '_>, path: &str, report: &mut ValidationReport) {
    let year = child_text(header, "Year").and_then(|v| v.parse::<i32>().ok());
    let month = child_text(header, "Month").and_then(|v| v.parse::<u8>().ok());
    let quarter = child_text(header, "Quarter").and_then(|v| v.parse::<u8>().ok());

    let ordinal = match (month, quarter) {
        (Some(m), _) if !(1..=12).contains(&m) => {
            report.error(
                PASS,
                "invalid-period",
                format!("{path}/Month"),
                format!("month {m} is out of range"),
            );
            return;
        }
        (_, Some(q)) if !(1..=4).contains(&q) => {
            report.error(
                PASS,
                "invalid-period",
                format!("{path}/Quarter"),
                format!("quarter {q} is out of range"),
            );
            return;
        }
        (Some(m), _) => m,
        (None, Some(q)) => q,
        (None, None) => return,
    };

    let (Some(year), Some(token)) = (year, child_text(header, "PeriodToken")) else {
        return;
    };
    let expected = format!("{year:04}{ordinal:02}01");
    if token != expected {
        report.error(
            PASS,
            "period-token-mismatch",
            format!("{path}/PeriodToken"),
            format!("expected {expected}, found {token:?}"),
        );
    }
}

fn check_ledger(ledger: Node<'_, '_>, path: &str, report: &mut ValidationReport) {
    for prefix in LEDGER_PREFIXES {
        let row_name = format!("{prefix}Row");
        let control_name = format!("{prefix}Control");
        let rows: Vec<_> = children(ledger, &row_name).collect();

        let mut tax_total = 0.0;
        for (index, row) in rows.iter().enumerate() {
            let row_path = format!("{path}/{row_name}[{}]", index + 1);
            let expected_ordinal = index + 1;

            match child_text(*row, "Ordinal").and_then(|v| v.parse::<usize>().ok()) {
                Some(ordinal) if ordinal == expected_ordinal => {}
                Some(ordinal) => report.error(
                    PASS,
                    "ledger-ordinal-sequence",
                    format!("{row_path}/Ordinal"),
                    format!("expected ordinal {expected_ordinal}, found {ordinal}"),
                ),
                None => {}
            }

            for name in ["NetAmount", "TaxAmount"] {
                if let Some(value) = child_number(*row, name) {
                    if value < 0.0 {
                        report.error(
                            PASS,
                            "negative-amount",
                            format!("{row_path}/{name}"),
                            format!("{name} must not be negative, found {value}"),
                        );
                    }
                }
            }
            tax_total += child_number(*row, "TaxAmount").unwrap_or(0.0);

            if let Some(issued) = child(*row, "IssueDate").map(text).filter(|v| !v.is_empty()) {
                if parse_date(issued).is_none() {
                    report.error(
                        PASS,
                        "invalid-date",
                        format!("{row_path}/IssueDate"),
                        format!("{issued:?} is not a YYYY-MM-DD date"),
                    );
                }
            }
        }

        let control_path = format!("{path}/{control_name}");
        let Some(control) = child(ledger, &control_name) else {
            if !rows.is_empty() {
                report.error(
                    PASS,
                    "missing-ledger-control",
                    control_path,
                    format!("{prefix} rows present without a control block"),
                );
            }
            continue;
        };

        match child_text(control, "RowCount").and_then(|v| v.parse::<usize>().ok()) {
            Some(count) if count == rows.len() => {}
            Some(count) => report.error(
                PASS,
                "ledger-count-mismatch",
                format!("{control_path}/RowCount"),
                format!("control states {count} rows, ledger has {}", rows.len()),
            ),
            None => report.error(
                PASS,
                "ledger-count-mismatch",
                format!("{control_path}/RowCount"),
                "control row count is missing or not an integer",
            ),
        }

        match child_number(control, "TaxTotal") {
            Some(total) if (total - tax_total).abs() < LEDGER_TOLERANCE => {}
            Some(total) => report.error(
                PASS,
                "ledger-total-mismatch",
                format!("{control_path}/TaxTotal"),
                format!("control states tax total {total}, rows sum to {tax_total}"),
            ),
            None => report.error(
                PASS,
                "ledger-total-mismatch",
                format!("{control_path}/TaxTotal"),
                "control tax total is missing or not numeric",
            ),
        }
    }
}
