use dd_core::{strip_outer_quotes, PrimitiveValue};
use dd_parser::{Node, NodeKind};

/// Literal value of a node: numbers and booleans are typed, strings lose
/// their outer quotes, anything else keeps its text.
pub fn literal_value(node: Node<'_>) -> PrimitiveValue {
    match node.kind() {
        NodeKind::Number => node
            .text()
            .parse::<f64>()
            .map(PrimitiveValue::Number)
            .unwrap_or_else(|_| PrimitiveValue::String(node.text().to_string())),
        NodeKind::Boolean => PrimitiveValue::Bool(node.text().eq_ignore_ascii_case("true")),
        NodeKind::String => PrimitiveValue::String(strip_outer_quotes(node.text()).to_string()),
        _ => PrimitiveValue::String(node.text().trim().to_string()),
    }
}

/// Operand of a comparison. Only numbers and booleans are typed; every other
/// operand keeps its exact source text, quotes included.
pub fn comparison_value(node: Node<'_>) -> PrimitiveValue {
    match node.kind() {
        NodeKind::Number | NodeKind::Boolean => literal_value(node),
        _ => PrimitiveValue::String(node.text().trim().to_string()),
    }
}

/// Integer literal, if the node is one.
pub fn integer_value(node: Node<'_>) -> Option<i64> {
    if node.kind() != NodeKind::Number {
        return None;
    }
    node.text().parse::<i64>().ok()
}

/// Strips the markers of a comment, keeping any leading space.
pub fn comment_text(node: Node<'_>) -> String {
    let text = node.text();
    if let Some(line) = text.strip_prefix("//") {
        return line.to_string();
    }
    let inner = text.strip_prefix("/*").unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod literal_tests {
    use super::*;
    use dd_parser::{parse, Field};

    fn with_value<T>(source: &str, check: impl FnOnce(Node<'_>) -> T) -> T {
        let tree = parse(source);
        let declaration = tree
            .root()
            .named_children()
            .next()
            .expect("declaration should exist");
        let value = declaration
            .child_by_field(Field::Value)
            .expect("value should exist");
        check(value)
    }

    #[test]
    fn literal_values_are_typed() {
        with_value("const int A = 5;", |node| {
            assert_eq!(literal_value(node), PrimitiveValue::Number(5.0));
            assert_eq!(integer_value(node), Some(5));
        });
        with_value("const int A = true;", |node| {
            assert_eq!(literal_value(node), PrimitiveValue::Bool(true));
        });
        with_value("const string A = \"say \\\"hi\\\"\";", |node| {
            assert_eq!(
                literal_value(node),
                PrimitiveValue::String("say \\\"hi\\\"".to_string())
            );
            assert_eq!(
                comparison_value(node),
                PrimitiveValue::String("\"say \\\"hi\\\"\"".to_string())
            );
        });
        with_value("const float A = 1.5;", |node| {
            assert_eq!(integer_value(node), None);
        });
    }
}
