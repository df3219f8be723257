//! Runs the three passes in order.

use crate::domain::business::check_business_rules;
use crate::domain::entities::{ValidationPolicy, ValidationReport};
use crate::domain::schema_pass::check_schema;
use crate::domain::structural::check_structure;
use chrono::{DateTime, Utc};
use shared_types::Variant;

/// Validate `content` as a `variant` declaration, judging dates against `now`.
pub fn validate_document(
    content: &str,
    variant: Variant,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let Some((doc, schema)) = check_structure(content, &mut report) else {
        return report;
    };
    let root = doc.root_element();

    check_schema(root, schema, variant, &mut report);
    check_business_rules(root, schema, policy, now, &mut report);

    report
}
