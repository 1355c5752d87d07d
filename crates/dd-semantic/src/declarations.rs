use dd_core::{
    strip_outer_quotes, DeclarationKind, DialogInstance, GlobalConstant, GlobalInstance,
    GlobalVariable, PrimitiveValue, ScriptFunction, SemanticModel, VerbatimDeclaration,
    ANIMATION_PARENT_TYPE, DIALOG_PARENT_TYPE, ITEM_PARENT_TYPE, NPC_PARENT_TYPES,
};
use dd_parser::{Field, Node, NodeKind};
use tracing::trace;

use crate::context::BuildContext;
use crate::literal::literal_value;

/// First pass: registers every top-level declaration and attaches the
/// comments written directly above it.
pub fn collect_declarations(root: Node<'_>, model: &mut SemanticModel, context: &mut BuildContext) {
    let mut pending_comments: Vec<String> = Vec::new();
    for child in root.children() {
        let comments = std::mem::take(&mut pending_comments);
        match child.kind() {
            NodeKind::Comment => {
                pending_comments = comments;
                pending_comments.push(child.text().to_string());
            }
            NodeKind::FunctionDeclaration => declare_function(child, comments, model, context),
            NodeKind::InstanceDeclaration => declare_instance(child, comments, model, context),
            NodeKind::VariableDeclaration => declare_global(child, comments, model),
            NodeKind::ClassDeclaration | NodeKind::PrototypeDeclaration => {
                declare_verbatim(child, comments, model)
            }
            _ => {}
        }
    }
    model.trailing_comments = pending_comments;
    context.finish_declarations();
}

fn declared_name<'t>(node: Node<'t>) -> Option<&'t str> {
    node.child_by_field(Field::Name)
        .filter(|name| !name.is_missing())
        .map(|name| name.text().trim())
        .filter(|name| !name.is_empty())
}

/// Whitespace between the declared name and the opening parenthesis.
fn space_before_paren(node: Node<'_>) -> bool {
    let Some(name) = node.child_by_field(Field::Name) else {
        return false;
    };
    node.children()
        .find(|child| child.kind() == NodeKind::Token("(") && child.start_byte() >= name.end_byte())
        .map(|paren| paren.start_byte() > name.end_byte())
        .unwrap_or(false)
}

fn keyword_text(node: Node<'_>) -> Option<String> {
    node.child_by_field(Field::Keyword)
        .map(|keyword| keyword.text().to_string())
}

fn declare_function(
    node: Node<'_>,
    comments: Vec<String>,
    model: &mut SemanticModel,
    context: &mut BuildContext,
) {
    let Some(name) = declared_name(node) else {
        return;
    };
    let return_type = node
        .child_by_field(Field::ReturnType)
        .map(|node| node.text().trim().to_string())
        .unwrap_or_else(|| "void".to_string());
    let mut function = ScriptFunction::new(name, return_type);
    function.parameters = node
        .child_by_field(Field::Parameters)
        .map(parameter_text)
        .unwrap_or_default();
    function.leading_comments = comments;
    function.style.keyword = keyword_text(node);
    function.style.space_before_paren = space_before_paren(node);
    function.style.has_body_content = node
        .child_by_field(Field::Body)
        .map(|body| body.named_children().any(|child| !child.is_comment()))
        .unwrap_or(false);

    let id = model.functions.insert(function);
    context.register_function(name, id, node.id());
    model.record_declaration(DeclarationKind::Function, name);
    trace!(function = name, "declared function");
}

/// Parameter list without its parentheses.
fn parameter_text(list: Node<'_>) -> String {
    let text = list.text().trim();
    let text = text.strip_prefix('(').unwrap_or(text);
    let text = text.strip_suffix(')').unwrap_or(text);
    text.trim().to_string()
}

fn declare_instance(
    node: Node<'_>,
    comments: Vec<String>,
    model: &mut SemanticModel,
    context: &mut BuildContext,
) {
    let Some(name) = declared_name(node) else {
        return;
    };
    let parent_type = node
        .child_by_field(Field::Parent)
        .filter(|parent| !parent.is_missing())
        .map(|parent| parent.text().trim().to_string())
        .unwrap_or_default();
    let parent_upper = parent_type.to_uppercase();

    if parent_upper == DIALOG_PARENT_TYPE {
        let mut dialog = DialogInstance::new(name, parent_type);
        dialog.keyword = keyword_text(node);
        dialog.space_before_paren = space_before_paren(node);
        dialog.leading_comments = comments;
        model.dialogs.insert(name.to_string(), dialog);
        context.register_dialog(name, node.id());
        model.record_declaration(DeclarationKind::Dialog, name);
        trace!(dialog = name, "declared dialog");
        return;
    }

    let instance = GlobalInstance {
        name: name.to_string(),
        parent_type,
        display_name: display_name(node),
        position: node.start_position(),
        range: node.range(),
        source_text: node.text().to_string(),
        leading_comments: comments,
    };
    if NPC_PARENT_TYPES.contains(&parent_upper.as_str()) {
        model.npcs.insert(name.to_string(), instance.clone());
    } else if parent_upper == ITEM_PARENT_TYPE {
        model.items.insert(name.to_string(), instance.clone());
    } else if parent_upper == ANIMATION_PARENT_TYPE {
        model.animations.insert(name.to_string(), instance.clone());
    }
    model.instances.insert(name.to_string(), instance);
    model.record_declaration(DeclarationKind::Instance, name);
}

/// Value of a `name = "..."` assignment in an instance body.
fn display_name(node: Node<'_>) -> Option<String> {
    let body = node.child_by_field(Field::Body)?;
    body.named_children()
        .filter(|statement| statement.kind() == NodeKind::AssignmentStatement)
        .find_map(|statement| {
            let left = statement.child_by_field(Field::Left)?;
            let right = statement.child_by_field(Field::Right)?;
            if !left.text().trim().eq_ignore_ascii_case("name") || right.kind() != NodeKind::String {
                return None;
            }
            let value = strip_outer_quotes(right.text()).trim();
            (!value.is_empty()).then(|| value.to_string())
        })
}

fn declare_global(node: Node<'_>, comments: Vec<String>, model: &mut SemanticModel) {
    let Some(name) = declared_name(node) else {
        return;
    };
    let type_name = node
        .child_by_field(Field::Type)
        .map(|node| node.text().trim().to_string())
        .unwrap_or_default();
    let is_const = node
        .child_by_field(Field::Keyword)
        .map(|keyword| keyword.text().eq_ignore_ascii_case("const"))
        .unwrap_or(false);

    if is_const {
        let value = node
            .child_by_field(Field::Value)
            .map(literal_value)
            .unwrap_or(PrimitiveValue::Number(0.0));
        model.constants.insert(
            name.to_string(),
            GlobalConstant {
                name: name.to_string(),
                type_name,
                value,
                position: node.start_position(),
                range: node.range(),
                source_text: node.text().to_string(),
                leading_comments: comments,
            },
        );
        model.record_declaration(DeclarationKind::Constant, name);
    } else {
        model.variables.insert(
            name.to_string(),
            GlobalVariable {
                name: name.to_string(),
                type_name,
                position: node.start_position(),
                range: node.range(),
                source_text: node.text().to_string(),
                leading_comments: comments,
            },
        );
        model.record_declaration(DeclarationKind::Variable, name);
    }
}

fn declare_verbatim(node: Node<'_>, comments: Vec<String>, model: &mut SemanticModel) {
    let Some(name) = declared_name(node) else {
        return;
    };
    let keyword = keyword_text(node).unwrap_or_else(|| {
        if node.kind() == NodeKind::ClassDeclaration {
            "class".to_string()
        } else {
            "prototype".to_string()
        }
    });
    model.verbatim.insert(
        name.to_string(),
        VerbatimDeclaration {
            name: name.to_string(),
            keyword,
            position: node.start_position(),
            range: node.range(),
            source_text: node.text().to_string(),
            leading_comments: comments,
        },
    );
    model.record_declaration(DeclarationKind::Verbatim, name);
}
