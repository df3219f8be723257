//! # Receipt Parsing
//!
//! ```text
//! Receipt
//! ├── Header: FormCode, TaxOfficeCode, Period, TaxpayerId
//! └── ConfirmationBlock: ConfirmationNumber, ConfirmationDate, StatusCode, Signature?
//! ```
//!
//! Elements are matched by local name; the namespace is not checked.

use crate::domain::entities::ParsedReceipt;
use crate::domain::errors::ConfirmationError;
use roxmltree::{Document, Node};

pub const RECEIPT_ROOT: &str = "Receipt";

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn section<'a, 'input>(
    root: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, ConfirmationError> {
    child(root, name).ok_or(ConfirmationError::MissingElement(name))
}

fn required(node: Node<'_, '_>, name: &'static str) -> Result<String, ConfirmationError> {
    child(node, name)
        .map(|n| n.text().unwrap_or("").trim().to_string())
        .ok_or(ConfirmationError::MissingElement(name))
}

pub fn parse_receipt(xml: &str) -> Result<ParsedReceipt, ConfirmationError> {
    let doc = Document::parse(xml).map_err(|e| ConfirmationError::Malformed(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != RECEIPT_ROOT {
        return Err(ConfirmationError::Malformed(format!(
            "expected root {RECEIPT_ROOT}, found {}",
            root.tag_name().name()
        )));
    }

    let header = section(root, "Header")?;
    let block = section(root, "ConfirmationBlock")?;

    let signature_node = child(block, "Signature");
    let signature = signature_node
        .and_then(|n| n.text())
        .map(|t| t.split_whitespace().collect::<String>())
        .filter(|t| !t.is_empty());
    let signed_content = match signature_node {
        Some(node) => {
            let range = node.range();
            format!("{}{}", &xml[..range.start], &xml[range.end..])
        }
        None => xml.to_string(),
    };

    Ok(ParsedReceipt {
        form_code: required(header, "FormCode")?,
        tax_office_code: required(header, "TaxOfficeCode")?,
        period: required(header, "Period")?,
        taxpayer_id: required(header, "TaxpayerId")?,
        confirmation_number: required(block, "ConfirmationNumber")?,
        confirmation_date: required(block, "ConfirmationDate")?,
        status_code: required(block, "StatusCode")?,
        signature,
        signed_content,
        raw: xml.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const NUMBER: &str = "AB12CD34EF56GH78IJ90KL12MN34OP56";

    pub struct ReceiptSpec<'a> {
        pub form_code: &'a str,
        pub office: &'a str,
        pub period: &'a str,
        pub taxpayer: &'a str,
        pub number: &'a str,
        pub date: &'a str,
        pub status: &'a str,
    }

    impl Default for ReceiptSpec<'_> {
        fn default() -> Self {
            Self {
                form_code: "JPK_V7M",
                office: "1471",
                period: "2024-03",
                taxpayer: "1234567890",
                number: NUMBER,
                date: "2024-04-11T09:30:00Z",
                status: "200",
            }
        }
    }

    /// Receipt text split around where the signature goes.
    pub fn receipt_parts(spec: &ReceiptSpec<'_>) -> (String, String) {
        let head = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Receipt xmlns=\"urn:tax-authority:schemas:receipt:1\">\n  \
             <Header>\n    \
             <FormCode>{}</FormCode>\n    \
             <TaxOfficeCode>{}</TaxOfficeCode>\n    \
             <Period>{}</Period>\n    \
             <TaxpayerId>{}</TaxpayerId>\n  \
             </Header>\n  \
             <ConfirmationBlock>\n    \
             <ConfirmationNumber>{}</ConfirmationNumber>\n    \
             <ConfirmationDate>{}</ConfirmationDate>\n    \
             <StatusCode>{}</StatusCode>\n    ",
            spec.form_code, spec.office, spec.period, spec.taxpayer, spec.number, spec.date, spec.status
        );
        let tail = "\n  </ConfirmationBlock>\n</Receipt>\n".to_string();
        (head, tail)
    }

    pub fn unsigned_receipt(spec: &ReceiptSpec<'_>) -> String {
        let (head, tail) = receipt_parts(spec);
        format!("{head}{tail}")
    }

    pub fn receipt_with_signature(spec: &ReceiptSpec<'_>, signature: &str) -> String {
        let (head, tail) = receipt_parts(spec);
        format!("{head}<Signature>{signature}</Signature>{tail}")
    }
}
