//! Small helpers over `roxmltree` nodes.

use roxmltree::Node;

/// First child element with the given local name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// All child elements with the given local name, in document order.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text content of an element (empty string when absent).
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Text of a named child element.
pub fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).map(text)
}

/// Numeric value of a named child element, if present and numeric.
pub fn child_number(node: Node<'_, '_>, name: &str) -> Option<f64> {
    child_text(node, name)
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
