//! # Response Parsing
//!
//! Elements are matched by local name so SOAP 1.1 and 1.2 envelopes and any
//! service prefix are accepted.

use crate::domain::entities::{StatusReport, SubmissionReceipt, TransportStatus};
use crate::domain::errors::TransportError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use roxmltree::{Document, Node};

fn find<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text_of(node: Node<'_, '_>, name: &str) -> Option<String> {
    find(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse(body: &str) -> Result<Document<'_>, TransportError> {
    Document::parse(body).map_err(|e| TransportError::UnexpectedResponse(format!("malformed XML: {e}")))
}

fn soap_body<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>, TransportError> {
    let root = doc.root_element();
    if root.tag_name().name() != "Envelope" {
        return Err(TransportError::UnexpectedResponse(format!(
            "expected SOAP Envelope, found {}",
            root.tag_name().name()
        )));
    }
    root.children()
        .find(|n| n.is_element() && n.tag_name().name() == "Body")
        .ok_or_else(|| TransportError::UnexpectedResponse("SOAP envelope has no Body".into()))
}

fn fault_error(fault: Node<'_, '_>) -> TransportError {
    // SOAP 1.1: faultcode/faultstring. SOAP 1.2: Code/Value, Reason/Text.
    let code = text_of(fault, "faultcode")
        .or_else(|| find(fault, "Code").and_then(|c| text_of(c, "Value")))
        .unwrap_or_else(|| "unknown".to_string());
    let reason = text_of(fault, "faultstring")
        .or_else(|| find(fault, "Reason").and_then(|r| text_of(r, "Text")))
        .unwrap_or_default();
    TransportError::SoapFault { code, reason }
}

/// Fault carried in `body`, if it is a SOAP fault.
pub fn parse_fault(body: &str) -> Option<TransportError> {
    let doc = Document::parse(body).ok()?;
    let soap_body = soap_body(&doc).ok()?;
    find(soap_body, "Fault").map(fault_error)
}

fn response_element<'a, 'input>(
    doc: &'a Document<'input>,
    element: &str,
) -> Result<Node<'a, 'input>, TransportError> {
    let soap_body = soap_body(doc)?;
    if let Some(fault) = find(soap_body, "Fault") {
        return Err(fault_error(fault));
    }
    find(soap_body, element)
        .ok_or_else(|| TransportError::UnexpectedResponse(format!("missing {element}")))
}

fn status_code(node: Node<'_, '_>) -> Result<u16, TransportError> {
    let raw = text_of(node, "StatusCode")
        .ok_or_else(|| TransportError::UnexpectedResponse("missing StatusCode".into()))?;
    raw.parse()
        .map_err(|_| TransportError::UnexpectedResponse(format!("StatusCode {raw:?} is not numeric")))
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

pub fn parse_submission(body: &str) -> Result<SubmissionReceipt, TransportError> {
    let doc = parse(body)?;
    let node = response_element(&doc, "SendDocumentResponse")?;

    let confirmation_number = text_of(node, "ConfirmationNumber")
        .ok_or_else(|| TransportError::UnexpectedResponse("missing ConfirmationNumber".into()))?;
    let code = status_code(node)?;

    Ok(SubmissionReceipt {
        confirmation_number,
        confirmation_date: text_of(node, "ConfirmationDate").and_then(|d| parse_instant(&d)),
        status: TransportStatus::from_code(code),
        status_code: code,
        message: text_of(node, "Message"),
    })
}

pub fn parse_status(body: &str, confirmation_number: &str) -> Result<StatusReport, TransportError> {
    let doc = parse(body)?;
    let node = response_element(&doc, "GetStatusResponse")?;
    let code = status_code(node)?;

    let receipt = match text_of(node, "Receipt") {
        Some(encoded) => {
            let bytes = BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| TransportError::UnexpectedResponse(format!("receipt is not base64: {e}")))?;
            let xml = String::from_utf8(bytes)
                .map_err(|_| TransportError::UnexpectedResponse("receipt is not UTF-8".into()))?;
            Some(xml)
        }
        None => None,
    };

    Ok(StatusReport {
        confirmation_number: text_of(node, "ConfirmationNumber")
            .unwrap_or_else(|| confirmation_number.to_string()),
        status: TransportStatus::from_code(code),
        status_code: code,
        status_description: text_of(node, "Description").unwrap_or_default(),
        processing_date: text_of(node, "ProcessingDate").and_then(|d| parse_instant(&d)),
        receipt,
    })
}

pub fn parse_ping(body: &str) -> Result<(), TransportError> {
    let doc = parse(body)?;
    response_element(&doc, "PingResponse").map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(inner: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" xmlns:t=\"urn:t\"><s:Body>{inner}</s:Body></s:Envelope>"
        )
    }

    #[test]
    fn test_submission_receipt() {
        let body = envelope(
            "<t:SendDocumentResponse><t:ConfirmationNumber>AB12CD34EF56GH78IJ90KL12MN34OP56</t:ConfirmationNumber>\
             <t:StatusCode>300</t:StatusCode><t:Message>Received</t:Message>\
             <t:ConfirmationDate>2024-04-10T12:00:00Z</t:ConfirmationDate></t:SendDocumentResponse>",
        );
        let receipt = parse_submission(&body).unwrap();
        assert_eq!(receipt.confirmation_number, "AB12CD34EF56GH78IJ90KL12MN34OP56");
        assert_eq!(receipt.status, TransportStatus::Submitted);
        assert_eq!(receipt.message.as_deref(), Some("Received"));
        assert!(receipt.confirmation_date.is_some());
    }

    #[test]
    fn test_status_with_receipt() {
        let receipt_xml = "<Receipt/>";
        let body = envelope(&format!(
            "<t:GetStatusResponse><t:StatusCode>200</t:StatusCode><t:Description>Accepted</t:Description>\
             <t:ProcessingDate>2024-04-11</t:ProcessingDate><t:Receipt>{}</t:Receipt></t:GetStatusResponse>",
            BASE64.encode(receipt_xml)
        ));
        let report = parse_status(&body, "N1").unwrap();
        assert_eq!(report.status, TransportStatus::Accepted);
        assert_eq!(report.confirmation_number, "N1");
        assert_eq!(report.receipt.as_deref(), Some(receipt_xml));
        assert_eq!(
            report.processing_date.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 4, 11).unwrap()
        );
    }

    #[test]
    fn test_fault_soap11_and_soap12() {
        let v11 = envelope("<s:Fault><faultcode>s:Client</faultcode><faultstring>Schema violation</faultstring></s:Fault>");
        assert_eq!(
            parse_fault(&v11),
            Some(TransportError::SoapFault {
                code: "s:Client".into(),
                reason: "Schema violation".into()
            })
        );
        assert!(matches!(parse_submission(&v11), Err(TransportError::SoapFault { .. })));

        let v12 = "<e:Envelope xmlns:e=\"http://www.w3.org/2003/05/soap-envelope\"><e:Body><e:Fault>\
                   <e:Code><e:Value>e:Sender</e:Value></e:Code><e:Reason><e:Text>Bad token</e:Text></e:Reason>\
                   </e:Fault></e:Body></e:Envelope>";
        assert_eq!(
            parse_fault(v12),
            Some(TransportError::SoapFault {
                code: "e:Sender".into(),
                reason: "Bad token".into()
            })
        );
    }

    #[test]
    fn test_unexpected_bodies() {
        assert!(matches!(
            parse_submission("<html>gateway</html>"),
            Err(TransportError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            parse_submission("not xml"),
            Err(TransportError::UnexpectedResponse(_))
        ));
        let no_number = envelope("<t:SendDocumentResponse><t:StatusCode>300</t:StatusCode></t:SendDocumentResponse>");
        assert!(matches!(
            parse_submission(&no_number),
            Err(TransportError::UnexpectedResponse(_))
        ));
        assert!(parse_fault(&envelope("<t:PingResponse/>")).is_none());
        assert!(parse_ping(&envelope("<t:PingResponse/>")).is_ok());
    }
}
