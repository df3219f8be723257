//! # Pass 2: Schema
//!
//! Required sections and fields per schema and variant. Missing mandatory
//! items are errors, missing optional ones are warnings.

use crate::domain::entities::{ValidationPass, ValidationReport};
use crate::domain::tree::{child, children, text};
use roxmltree::Node;
use shared_types::Variant;
use tf_01_renderer::domain::schema::{
    FieldKind, FieldSpec, Requirement, SchemaDescriptor, LEDGER_ROW_FIELDS, LEDGER_SECTION,
};

const PASS: ValidationPass = ValidationPass::Schema;

/// Ledger row element prefixes.
pub const LEDGER_PREFIXES: [&str; 2] = ["Sales", "Purchase"];

pub fn check_schema(
    root: Node<'_, '_>,
    schema: &SchemaDescriptor,
    variant: Variant,
    report: &mut ValidationReport,
) {
    let root_path = format!("/{}", schema.root_element);

    for section in schema.sections {
        let path = format!("{root_path}/{}", section.name);
        let Some(node) = child(root, section.name) else {
            if section.required {
                report.error(
                    PASS,
                    "missing-section",
                    path,
                    format!("mandatory section {} is missing", section.name),
                );
            } else {
                report.warning(
                    PASS,
                    "missing-optional-section",
                    path,
                    format!("optional section {} is absent", section.name),
                );
            }
            continue;
        };
        check_fields(node, &path, section.fields, variant, report);
    }

    if let Some(header) = child(root, "Header") {
        check_form_code(header, schema, variant, &root_path, report);
    }

    if schema.has_ledger {
        if let Some(ledger) = child(root, LEDGER_SECTION) {
            check_ledger_rows(ledger, &format!("{root_path}/{LEDGER_SECTION}"), report);
        }
    }
}

fn check_fields(
    node: Node<'_, '_>,
    path: &str,
    fields: &[FieldSpec],
    variant: Variant,
    report: &mut ValidationReport,
) {
    for field in fields {
        let field_path = format!("{path}/{}", field.name);
        match child(node, field.name) {
            Some(element) => {
                if !field.requirement.applies_to(variant) {
                    report.warning(
                        PASS,
                        "unexpected-field",
                        field_path,
                        format!("{} does not belong in a {variant} declaration", field.name),
                    );
                    continue;
                }
                check_value(text(element), field, &field_path, report);
            }
            None if field.requirement.required_for(variant) => report.error(
                PASS,
                "missing-field",
                field_path,
                format!("mandatory field {} is missing", field.name),
            ),
            None if field.requirement.applies_to(variant) => report.warning(
                PASS,
                "missing-optional-field",
                field_path,
                format!("optional field {} is absent", field.name),
            ),
            None => {}
        }
    }
}

fn check_value(value: &str, field: &FieldSpec, path: &str, report: &mut ValidationReport) {
    match field.kind {
        FieldKind::Integer if value.parse::<i64>().is_err() => report.error(
            PASS,
            "not-an-integer",
            path,
            format!("{} must be an integer, found {value:?}", field.name),
        ),
        FieldKind::Amount if !value.parse::<f64>().is_ok_and(f64::is_finite) => report.error(
            PASS,
            "not-a-number",
            path,
            format!("{} must be numeric, found {value:?}", field.name),
        ),
        FieldKind::Text if value.is_empty() && field.requirement != Requirement::Optional => {
            report.error(
                PASS,
                "empty-field",
                path,
                format!("{} must not be empty", field.name),
            )
        }
        _ => {}
    }
}

fn check_form_code(
    header: Node<'_, '_>,
    schema: &SchemaDescriptor,
    variant: Variant,
    root_path: &str,
    report: &mut ValidationReport,
) {
    let Some(found) = child(header, "FormCode").map(text) else {
        return;
    };
    let expected = schema.declaration_type.form_code(variant);
    if found != expected.as_str() {
        report.error(
            PASS,
            "form-code-mismatch",
            format!("{root_path}/Header/FormCode"),
            format!("expected {expected} for a {variant} declaration, found {found:?}"),
        );
    }
}

fn check_ledger_rows(ledger: Node<'_, '_>, path: &str, report: &mut ValidationReport) {
    for prefix in LEDGER_PREFIXES {
        let row_name = format!("{prefix}Row");
        for (index, row) in children(ledger, &row_name).enumerate() {
            let row_path = format!("{path}/{row_name}[{}]", index + 1);
            for field in LEDGER_ROW_FIELDS {
                let field_path = format!("{row_path}/{}", field.name);
                match child(row, field.name) {
                    Some(element) => check_value(text(element), field, &field_path, report),
                    None => report.error(
                        PASS,
                        "missing-field",
                        field_path,
                        format!("ledger row field {} is missing", field.name),
                    ),
                }
            }
        }
    }
}
