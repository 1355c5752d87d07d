use dd_core::{DiagnosticPosition, SyntaxDiagnostic, SyntaxErrorKind};
use dd_parser::Node;

/// Collects error and missing-token nodes in document order.
pub fn collect_syntax_errors(root: Node<'_>) -> Vec<SyntaxDiagnostic> {
    let mut out = Vec::new();
    visit(root, &mut out);
    out
}

fn visit(node: Node<'_>, out: &mut Vec<SyntaxDiagnostic>) {
    if !node.has_error() {
        return;
    }
    let position = node.start_position().to_location();
    let position = DiagnosticPosition {
        row: position.line,
        column: position.column,
    };
    if node.is_error() {
        out.push(SyntaxDiagnostic {
            kind: SyntaxErrorKind::SyntaxError,
            message: format!(
                "Syntax error at line {}, column {}",
                position.row, position.column
            ),
            position,
            text: node.text().to_string(),
        });
        return;
    }
    if node.is_missing() {
        out.push(SyntaxDiagnostic {
            kind: SyntaxErrorKind::MissingToken,
            message: format!(
                "Missing {} at line {}, column {}",
                node.kind_name(),
                position.row,
                position.column
            ),
            position,
            text: String::new(),
        });
        return;
    }
    for child in node.children() {
        visit(child, out);
    }
}
