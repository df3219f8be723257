//! # Canonical Content and Signature Fragment
//!
//! The signed bytes are always the document with any signature fragment
//! removed. Embedding places the fragment immediately before the closing
//! root tag, replacing a previous one, so `strip(embed(d)) == strip(d)`.

use crate::domain::entities::StrategyOutput;
use crate::domain::errors::SignatureError;
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use shared_types::SignatureType;
use tf_01_renderer::domain::xml::escape;

pub const SIGNATURE_ELEMENT: &str = "DeclarationSignature";
pub const SIGNATURE_NAMESPACE: &str = "urn:tax-authority:schemas:signature:1";
pub const DIGEST_METHOD: &str = "SHA-256";

/// Placeholder signature value used by the unsigned strategy.
pub const UNSIGNED_PLACEHOLDER: &str = "UNSIGNED";

const FRAGMENT_INDENT: &str = "  ";

fn open_tag() -> String {
    format!("<{SIGNATURE_ELEMENT}")
}

fn close_tag() -> String {
    format!("</{SIGNATURE_ELEMENT}>")
}

/// Byte range of the embedded fragment, including its indent and trailing newline.
fn fragment_range(document: &str) -> Option<(usize, usize)> {
    let start = document.find(&open_tag())?;
    let close = close_tag();
    let end = start + document[start..].find(&close)? + close.len();

    let start = match document[..start].strip_suffix(FRAGMENT_INDENT) {
        Some(before) => before.len(),
        None => start,
    };
    let end = if document[end..].starts_with('\n') { end + 1 } else { end };
    Some((start, end))
}

/// The embedded fragment, if any.
pub fn embedded_fragment(document: &str) -> Option<&str> {
    fragment_range(document).map(|(start, end)| &document[start..end])
}

/// Document with any signature fragment removed.
pub fn strip_signature(document: &str) -> String {
    match fragment_range(document) {
        Some((start, end)) => {
            let mut out = String::with_capacity(document.len() - (end - start));
            out.push_str(&document[..start]);
            out.push_str(&document[end..]);
            out
        }
        None => document.to_string(),
    }
}

/// Lowercase hex SHA-256 of the canonical content.
pub fn content_hash(canonical: &str) -> String {
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Insert `fragment` before the closing root tag of the canonical form of `document`.
pub fn embed(document: &str, fragment: &str) -> Result<String, SignatureError> {
    let canonical = strip_signature(document);
    let trimmed = canonical.trim_end();
    let close_at = trimmed
        .rfind("</")
        .ok_or(SignatureError::InvalidDocument("no closing root tag"))?;
    let name = trimmed[close_at + 2..]
        .strip_suffix('>')
        .ok_or(SignatureError::InvalidDocument("malformed closing root tag"))?;
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
        return Err(SignatureError::InvalidDocument("malformed closing root tag"));
    }

    let mut out = String::with_capacity(canonical.len() + fragment.len());
    out.push_str(&canonical[..close_at]);
    out.push_str(fragment);
    out.push_str(&canonical[close_at..]);
    Ok(out)
}

/// Render the signature fragment for one signing.
pub fn build_fragment(
    signature_id: &str,
    signature_type: SignatureType,
    content_hash: &str,
    output: &StrategyOutput,
    signed_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![format!(
        "{FRAGMENT_INDENT}<{SIGNATURE_ELEMENT} xmlns=\"{SIGNATURE_NAMESPACE}\" Id=\"{}\" Type=\"{}\">",
        escape(signature_id),
        signature_type.as_str()
    )];
    let mut leaf = |depth: usize, name: &str, value: &str| {
        lines.push(format!(
            "{}<{name}>{}</{name}>",
            FRAGMENT_INDENT.repeat(depth),
            escape(value)
        ));
    };

    leaf(2, "Algorithm", &output.algorithm);
    leaf(2, "DigestMethod", DIGEST_METHOD);
    leaf(2, "DigestValue", content_hash);
    leaf(
        2,
        "SignatureValue",
        output.signature_value.as_deref().unwrap_or(UNSIGNED_PLACEHOLDER),
    );
    leaf(2, "Signer", &output.signer);
    leaf(2, "SignedAt", &signed_at.to_rfc3339_opts(SecondsFormat::Secs, true));
    if let Some(reference) = &output.provider_reference {
        leaf(2, "ProviderReference", reference);
    }

    if let Some(info) = &output.certificate_info {
        lines.push(format!("{}<Certificate>", FRAGMENT_INDENT.repeat(2)));
        let mut leaf = |name: &str, value: &str| {
            lines.push(format!(
                "{}<{name}>{}</{name}>",
                FRAGMENT_INDENT.repeat(3),
                escape(value)
            ));
        };
        leaf("SerialNumber", &info.serial);
        leaf("Issuer", &info.issuer);
        leaf("Subject", &info.subject);
        leaf("NotBefore", &info.not_before.to_rfc3339_opts(SecondsFormat::Secs, true));
        leaf("NotAfter", &info.not_after.to_rfc3339_opts(SecondsFormat::Secs, true));
        if let Some(der) = &output.certificate_der {
            leaf("X509Data", der);
        }
        lines.push(format!("{}</Certificate>", FRAGMENT_INDENT.repeat(2)));
    }

    lines.push(format!("{FRAGMENT_INDENT}</{SIGNATURE_ELEMENT}>"));
    let mut fragment = lines.join("\n");
    fragment.push('\n');
    fragment
}
