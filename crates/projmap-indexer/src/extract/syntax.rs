//! Small helpers over tree-sitter nodes.

use tree_sitter::Node;

/// Source text covered by `node`.
pub fn text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    src.get(node.byte_range()).unwrap_or("")
}

/// Text of a named field, if present.
pub fn field_text<'s>(node: Node<'_>, field: &str, src: &'s str) -> Option<&'s str> {
    node.child_by_field_name(field).map(|n| text(n, src))
}

/// Contents of a string literal without its quotes.
pub fn string_value(node: Node<'_>, src: &str) -> String {
    let raw = text(node, src);
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            chars.as_str().to_string()
        }
        _ => raw.to_string(),
    }
}

/// Annotation text with the leading `:` removed and whitespace trimmed.
/// Empty annotations count as absent.
pub fn annotation(node: Option<Node<'_>>, src: &str) -> Option<String> {
    let raw = text(node?, src).trim();
    let stripped = raw.strip_prefix(':').unwrap_or(raw).trim();
    (!stripped.is_empty()).then(|| stripped.to_string())
}

/// Whether `node` has a direct anonymous child token with this text
/// (`async`, `static`, `*`, `default`, ...).
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// First named direct child of the given kind.
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Location (1-based row:column) of the first error or missing node.
pub fn first_error(node: Node<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row + 1, pos.column + 1));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
