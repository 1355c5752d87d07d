use dd_core::strip_outer_quotes;
use dd_parser::{Field, Node, NodeKind};

/// Argument expressions of a call, in order, skipping comments.
pub fn argument_nodes<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field(Field::Arguments)
        .map(|list| {
            list.named_children()
                .filter(|child| !child.is_comment())
                .collect()
        })
        .unwrap_or_default()
}

/// Argument text with only the outer quotes of string literals removed.
pub fn normalize_argument(node: Node<'_>) -> String {
    if node.kind() == NodeKind::String {
        strip_outer_quotes(node.text()).to_string()
    } else {
        node.text().trim().to_string()
    }
}

/// Callee text of a call expression.
pub fn callee_name<'t>(call: Node<'t>) -> Option<&'t str> {
    call.child_by_field(Field::Function).map(|node| node.text())
}

#[cfg(test)]
mod arguments_tests {
    use super::*;
    use dd_parser::parse;

    #[test]
    fn strips_only_outer_quotes() {
        let tree = parse("func void F() { Foo(self, \"a \\\"b\\\"\", 3 + 4); };");
        let call = tree
            .root()
            .descendants()
            .find(|node| node.kind() == NodeKind::CallExpression)
            .expect("call should exist");
        assert_eq!(callee_name(call), Some("Foo"));
        let texts: Vec<String> = argument_nodes(call)
            .into_iter()
            .map(normalize_argument)
            .collect();
        assert_eq!(texts, vec!["self", "a \\\"b\\\"", "3 + 4"]);
    }

    #[test]
    fn calls_without_arguments_are_empty() {
        let tree = parse("func void F() { Foo(); };");
        let call = tree
            .root()
            .descendants()
            .find(|node| node.kind() == NodeKind::CallExpression)
            .expect("call should exist");
        assert!(argument_nodes(call).is_empty());
    }
}
