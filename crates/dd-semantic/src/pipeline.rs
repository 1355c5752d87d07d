use dd_core::SemanticModel;
use dd_parser::{parse, SyntaxTree};
use tracing::{debug, warn};

use crate::context::BuildContext;
use crate::declarations::collect_declarations;
use crate::diagnostics::collect_syntax_errors;
use crate::linking::link_and_analyze;

/// Builds the semantic model of a parsed tree. A tree with syntax errors
/// yields a model that carries only the diagnostics.
pub fn build_semantic_model(tree: &SyntaxTree) -> SemanticModel {
    let mut model = SemanticModel::new();
    model.errors = collect_syntax_errors(tree.root());
    model.has_errors = !model.errors.is_empty();
    if model.has_errors {
        warn!(
            errors = model.errors.len(),
            "syntax errors found, skipping semantic analysis"
        );
        return model;
    }

    let mut context = BuildContext::new();
    collect_declarations(tree.root(), &mut model, &mut context);
    debug!(
        declarations = model.declaration_order.len(),
        functions = model.functions.len(),
        "declarations collected"
    );
    if let Err(error) = link_and_analyze(tree, &mut model, &mut context) {
        warn!(%error, "linking failed");
    }
    debug!(
        dialogs = model.dialogs.len(),
        functions = model.functions.len(),
        instances = model.instances.len(),
        "functions linked and analyzed"
    );
    model
}

pub fn parse_semantic_model(source: &str) -> SemanticModel {
    let tree = parse(source);
    build_semantic_model(&tree)
}
