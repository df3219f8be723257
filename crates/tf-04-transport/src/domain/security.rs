//! # WS-Security Header
//!
//! Timestamp, X.509 binary security token and an XMLDSig signature. The
//! reference digest is SHA-256 over the body; the signature value is
//! RSA-SHA256 over `SignedInfo`. Both are written directly in exclusive c14n
//! form: no whitespace between tags, explicit end tags, each prefix declared
//! on the outermost element that uses it, declarations in prefix order
//! before other attributes. The serialized bytes are the canonical bytes.

use crate::domain::entities::{TransportCredentials, TIMESTAMP_VALIDITY};
use crate::domain::errors::TransportError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};

pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

const BASE64_BINARY: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";
const X509_V3: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509v3";
const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
const RSA_SHA256_URI: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
const SHA256_URI: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

/// `wsu:Id` of the SOAP body.
pub const BODY_ID: &str = "Body";
const TOKEN_ID: &str = "X509Token";
const TIMESTAMP_ID: &str = "Timestamp";

/// Created/expires pair of the security timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityTimestamp {
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl SecurityTimestamp {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let validity = ChronoDuration::seconds(TIMESTAMP_VALIDITY.as_secs() as i64);
        Self {
            created: now,
            expires: now + validity,
        }
    }
}

fn instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Base64 SHA-256 digest.
pub fn digest_b64(bytes: &[u8]) -> String {
    BASE64.encode(Sha256::digest(bytes))
}

/// Serialized `ds:SignedInfo` referencing the body digest.
pub fn signed_info(body_digest: &str) -> String {
    format!(
        "<ds:SignedInfo xmlns:ds=\"{DS_NS}\">\
         <ds:CanonicalizationMethod Algorithm=\"{EXC_C14N}\"></ds:CanonicalizationMethod>\
         <ds:SignatureMethod Algorithm=\"{RSA_SHA256_URI}\"></ds:SignatureMethod>\
         <ds:Reference URI=\"#{BODY_ID}\">\
         <ds:Transforms><ds:Transform Algorithm=\"{EXC_C14N}\"></ds:Transform></ds:Transforms>\
         <ds:DigestMethod Algorithm=\"{SHA256_URI}\"></ds:DigestMethod>\
         <ds:DigestValue>{body_digest}</ds:DigestValue>\
         </ds:Reference>\
         </ds:SignedInfo>"
    )
}

/// The `wsse:Security` header for a serialized body.
pub fn security_header(
    body: &str,
    credentials: &TransportCredentials,
    timestamp: SecurityTimestamp,
) -> Result<String, TransportError> {
    let info = signed_info(&digest_b64(body.as_bytes()));
    let signature = credentials
        .signing_key()
        .try_sign(info.as_bytes())
        .map_err(|e| TransportError::Envelope(format!("signing SignedInfo: {e}")))?;
    let signature_value = BASE64.encode(signature.to_bytes());
    let token = BASE64.encode(credentials.certificate_der());

    Ok(format!(
        "<wsse:Security xmlns:wsse=\"{WSSE_NS}\" xmlns:wsu=\"{WSU_NS}\" soap:mustUnderstand=\"1\">\
         <wsu:Timestamp wsu:Id=\"{TIMESTAMP_ID}\">\
         <wsu:Created>{created}</wsu:Created>\
         <wsu:Expires>{expires}</wsu:Expires>\
         </wsu:Timestamp>\
         <wsse:BinarySecurityToken EncodingType=\"{BASE64_BINARY}\" ValueType=\"{X509_V3}\" wsu:Id=\"{TOKEN_ID}\">{token}</wsse:BinarySecurityToken>\
         <ds:Signature xmlns:ds=\"{DS_NS}\">\
         {info}\
         <ds:SignatureValue>{signature_value}</ds:SignatureValue>\
         <ds:KeyInfo><wsse:SecurityTokenReference>\
         <wsse:Reference URI=\"#{TOKEN_ID}\" ValueType=\"{X509_V3}\"></wsse:Reference>\
         </wsse:SecurityTokenReference></ds:KeyInfo>\
         </ds:Signature>\
         </wsse:Security>",
        created = instant(timestamp.created),
        expires = instant(timestamp.expires),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_five_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();
        let ts = SecurityTimestamp::starting_at(now);
        assert_eq!((ts.expires - ts.created).num_seconds(), 300);
        assert_eq!(instant(ts.expires), "2024-04-10T12:05:00.000Z");
    }

    #[test]
    fn test_signed_info_carries_digest() {
        let digest = digest_b64(b"<soap:Body/>");
        let info = signed_info(&digest);
        assert!(info.contains(&format!("<ds:DigestValue>{digest}</ds:DigestValue>")));
        assert!(info.contains("URI=\"#Body\""));
        assert!(!info.contains('\n'));
    }
}
