//! # Pass 1: Structural
//!
//! XML declaration and encoding, well-formedness, known root element and
//! matching namespace. A parse failure stops the later passes.

use crate::domain::entities::{ValidationPass, ValidationReport};
use roxmltree::Document;
use tf_01_renderer::domain::schema::{schema_by_root, SchemaDescriptor};

const PASS: ValidationPass = ValidationPass::Structural;

/// Check the XML prolog: it must exist and declare UTF-8.
pub fn check_prolog(content: &str, report: &mut ValidationReport) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content.strip_prefix("<?xml") else {
        report.error(
            PASS,
            "missing-xml-declaration",
            "/",
            "document must start with an XML declaration",
        );
        return;
    };
    let Some(end) = rest.find("?>") else {
        report.error(PASS, "malformed-xml-declaration", "/", "unterminated XML declaration");
        return;
    };
    let prolog = rest[..end].to_ascii_lowercase().replace('\'', "\"");
    if !prolog.contains("encoding=\"utf-8\"") {
        report.error(
            PASS,
            "invalid-encoding",
            "/",
            "XML declaration must specify encoding=\"UTF-8\"",
        );
    }
}

/// Parse and identify the schema. `None` when later passes cannot run.
pub fn check_structure<'input>(
    content: &'input str,
    report: &mut ValidationReport,
) -> Option<(Document<'input>, &'static SchemaDescriptor)> {
    check_prolog(content, report);

    let doc = match Document::parse(content) {
        Ok(doc) => doc,
        Err(e) => {
            report.error(PASS, "malformed-xml", "/", format!("document is not well-formed: {e}"));
            return None;
        }
    };

    let root = doc.root_element();
    let root_name = root.tag_name().name();
    let path = format!("/{root_name}");
    let Some(schema) = schema_by_root(root_name) else {
        report.error(
            PASS,
            "unknown-root-element",
            path,
            format!("root element {root_name} is not a known declaration schema"),
        );
        return None;
    };

    match root.tag_name().namespace() {
        Some(ns) if ns == schema.namespace => {}
        Some(ns) => report.error(
            PASS,
            "namespace-mismatch",
            path,
            format!("expected namespace {}, found {ns}", schema.namespace),
        ),
        None => report.error(
            PASS,
            "namespace-missing",
            path,
            format!("root element must declare namespace {}", schema.namespace),
        ),
    }

    Some((doc, schema))
}
