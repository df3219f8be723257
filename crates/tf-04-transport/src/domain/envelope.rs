//! # SOAP Envelope
//!
//! Builds the request envelope for each service operation, signed with the
//! WS-Security header from `security`.

use crate::domain::entities::TransportCredentials;
use crate::domain::errors::TransportError;
use crate::domain::security::{security_header, SecurityTimestamp, BODY_ID, WSU_NS};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use tf_01_renderer::domain::xml::XML_DECLARATION;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SERVICE_NAMESPACE: &str = "urn:tax-authority:services:filing:1";

/// One service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapOperation<'a> {
    /// Submit a signed declaration document.
    SendDocument { document: &'a str },
    /// Poll the status of an earlier submission.
    GetStatus { confirmation_number: &'a str },
    /// Connectivity and credential check.
    Ping,
}

impl SoapOperation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendDocument { .. } => "SendDocument",
            Self::GetStatus { .. } => "GetStatus",
            Self::Ping => "Ping",
        }
    }

    /// Local name of the expected response element.
    pub fn response_element(&self) -> String {
        format!("{}Response", self.name())
    }

    /// Payload element in canonical form. `tns` is declared here, where it
    /// is first used, so the body carries only the prefixes it uses itself.
    fn payload(&self) -> String {
        match self {
            Self::SendDocument { document } => format!(
                "<tns:SendDocument xmlns:tns=\"{SERVICE_NAMESPACE}\"><tns:Document>{}</tns:Document></tns:SendDocument>",
                BASE64.encode(document.as_bytes())
            ),
            Self::GetStatus {
                confirmation_number,
            } => format!(
                "<tns:GetStatus xmlns:tns=\"{SERVICE_NAMESPACE}\"><tns:ConfirmationNumber>{}</tns:ConfirmationNumber></tns:GetStatus>",
                canonical_text(confirmation_number)
            ),
            Self::Ping => format!("<tns:Ping xmlns:tns=\"{SERVICE_NAMESPACE}\"></tns:Ping>"),
        }
    }
}

/// Text node escaping as exclusive c14n writes it: quotes stay literal,
/// carriage returns become character references.
fn canonical_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

/// A request ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    pub operation: &'static str,
    /// Value for the `SOAPAction` HTTP header.
    pub action: String,
    pub envelope: String,
}

/// Body element in exclusive c14n form: only the visibly used `soap` and
/// `wsu` prefixes, declared in prefix order, then `wsu:Id`. These bytes
/// are what the reference digest covers.
pub fn body(operation: &SoapOperation<'_>) -> String {
    format!(
        "<soap:Body xmlns:soap=\"{SOAP_ENV_NS}\" xmlns:wsu=\"{WSU_NS}\" wsu:Id=\"{BODY_ID}\">{}</soap:Body>",
        operation.payload()
    )
}

pub fn build_request(
    operation: &SoapOperation<'_>,
    credentials: &TransportCredentials,
    action_prefix: &str,
    now: DateTime<Utc>,
) -> Result<SoapRequest, TransportError> {
    let body = body(operation);
    let header = security_header(&body, credentials, SecurityTimestamp::starting_at(now))?;

    let envelope = format!(
        "{XML_DECLARATION}\n<soap:Envelope xmlns:soap=\"{SOAP_ENV_NS}\"><soap:Header>{header}</soap:Header>{body}</soap:Envelope>"
    );

    Ok(SoapRequest {
        operation: operation.name(),
        action: format!("{}/{}", action_prefix.trim_end_matches('/'), operation.name()),
        envelope,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::entities::TransportCredentials;
    use rcgen::{CertificateParams, DnType, KeyPair};

    pub const SIGNER_KEY_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/signer_key.pem"));

    pub fn credentials() -> TransportCredentials {
        let key = KeyPair::from_pem(SIGNER_KEY_PEM).unwrap();
        let mut params = CertificateParams::default();
        params
            .distinguished_name
            .push(DnType::CommonName, "Filing Client");
        let cert = params.self_signed(&key).unwrap();
        TransportCredentials::from_pem(SIGNER_KEY_PEM, cert.der()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::credentials;
    use super::*;
    use crate::domain::security::{digest_b64, signed_info};
    use chrono::TimeZone;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;
    use rsa::RsaPublicKey;
    use sha2::Sha256;
    use tf_03_signature::LoadedCertificate;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
    }

    fn between<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
        let start = text.find(open).unwrap() + open.len();
        let end = start + text[start..].find(close).unwrap();
        &text[start..end]
    }

    #[test]
    fn test_envelope_is_well_formed_and_carries_document() {
        let creds = credentials();
        let request = build_request(
            &SoapOperation::SendDocument {
                document: "<VatReturn/>",
            },
            &creds,
            SERVICE_NAMESPACE,
            now(),
        )
        .unwrap();

        assert_eq!(request.action, "urn:tax-authority:services:filing:1/SendDocument");
        let doc = roxmltree::Document::parse(&request.envelope).unwrap();
        let encoded = doc
            .descendants()
            .find(|n| n.has_tag_name((SERVICE_NAMESPACE, "Document")))
            .and_then(|n| n.text())
            .unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), b"<VatReturn/>");
        assert!(doc
            .descendants()
            .any(|n| n.has_tag_name((WSU_NS, "Created")) && n.text() == Some("2024-04-10T12:00:00.000Z")));
    }

    #[test]
    fn test_security_signature_verifies() {
        let creds = credentials();
        let request = build_request(
            &SoapOperation::GetStatus {
                confirmation_number: "AB12CD34EF56GH78IJ90KL12MN34OP56",
            },
            &creds,
            SERVICE_NAMESPACE,
            now(),
        )
        .unwrap();

        let body_xml = body(&SoapOperation::GetStatus {
            confirmation_number: "AB12CD34EF56GH78IJ90KL12MN34OP56",
        });
        assert!(request.envelope.contains(&body_xml));
        let digest = between(&request.envelope, "<ds:DigestValue>", "</ds:DigestValue>");
        assert_eq!(digest, digest_b64(body_xml.as_bytes()));

        let info = signed_info(digest);
        assert!(request.envelope.contains(&info));
        let value = between(&request.envelope, "<ds:SignatureValue>", "</ds:SignatureValue>");
        let signature = Signature::try_from(BASE64.decode(value).unwrap().as_slice()).unwrap();

        let token = between(&request.envelope, "wsu:Id=\"X509Token\">", "</wsse:BinarySecurityToken>");
        let cert = LoadedCertificate::from_der(BASE64.decode(token).unwrap()).unwrap();
        let public: RsaPublicKey = cert.public_key;
        VerifyingKey::<Sha256>::new(public)
            .verify(info.as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn test_status_query_is_escaped() {
        let xml = body(&SoapOperation::GetStatus {
            confirmation_number: "A<B\"C\r",
        });
        assert!(xml.contains(">A&lt;B\"C&#xD;<"));
    }

    #[test]
    fn test_digested_body_is_exclusive_canonical_form() {
        let expected = "<soap:Body \
            xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" \
            xmlns:wsu=\"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd\" \
            wsu:Id=\"Body\">\
            <tns:GetStatus xmlns:tns=\"urn:tax-authority:services:filing:1\">\
            <tns:ConfirmationNumber>AB12CD34EF56GH78IJ90KL12MN34OP56</tns:ConfirmationNumber>\
            </tns:GetStatus></soap:Body>";
        let operation = SoapOperation::GetStatus {
            confirmation_number: "AB12CD34EF56GH78IJ90KL12MN34OP56",
        };
        assert_eq!(body(&operation), expected);

        let request = build_request(&operation, &credentials(), SERVICE_NAMESPACE, now()).unwrap();
        let digest = between(&request.envelope, "<ds:DigestValue>", "</ds:DigestValue>");
        assert_eq!(digest, digest_b64(expected.as_bytes()));
    }

    #[test]
    fn test_body_declares_only_prefixes_it_uses() {
        for operation in [
            SoapOperation::SendDocument { document: "<VatReturn/>" },
            SoapOperation::Ping,
        ] {
            let xml = body(&operation);
            let open_tag = &xml[..xml.find('>').unwrap()];
            assert!(!open_tag.contains("xmlns:tns"), "{open_tag}");
            let payload = &xml[open_tag.len() + 1..];
            assert!(payload.starts_with(&format!(
                "<tns:{} xmlns:tns=\"{SERVICE_NAMESPACE}\">",
                operation.name()
            )));
            roxmltree::Document::parse(&xml).unwrap();
        }
    }
}
