use std::collections::BTreeSet;

use dd_core::{
    Action, ByteRange, Condition, DaedalusError, FunctionId, PropertySpacing, PropertyValue,
    SemanticModel,
};
use dd_parser::{Field, Node, NodeKind, SyntaxTree};
use tracing::{debug, trace};

use crate::actions::{classify_action, classify_assignment};
use crate::arguments::callee_name;
use crate::conditions::collect_conditions;
use crate::context::BuildContext;

/// Second pass: links dialog properties to functions, then classifies every
/// function body. All properties are linked before any body is analyzed so
/// that a function's role does not depend on declaration order.
pub fn link_and_analyze(
    tree: &SyntaxTree,
    model: &mut SemanticModel,
    context: &mut BuildContext,
) -> Result<(), DaedalusError> {
    if !context.declarations_collected() {
        return Err(DaedalusError::new(
            "SEMANTIC_PASS_ORDER",
            "Declarations must be collected before linking.",
        ));
    }

    let root = tree.root();
    for node in root.named_children() {
        if node.kind() != NodeKind::InstanceDeclaration {
            continue;
        }
        let Some(name) = node.child_by_field(Field::Name).map(|name| name.text().trim()) else {
            continue;
        };
        if model.dialogs.contains_key(name) && context.is_winning_dialog(name, node.id()) {
            link_properties(node, name, model, context);
        }
    }

    for node in root.named_children() {
        if node.kind() != NodeKind::FunctionDeclaration {
            continue;
        }
        let Some(name) = node.child_by_field(Field::Name).map(|name| name.text().trim()) else {
            continue;
        };
        let Some(id) = model.functions.id_of(name) else {
            continue;
        };
        if context.is_winning_function(id, node.id()) {
            analyze_function(node, id, tree.source(), model, context);
        }
    }
    Ok(())
}

fn link_properties(
    node: Node<'_>,
    dialog_name: &str,
    model: &mut SemanticModel,
    context: &mut BuildContext,
) {
    let Some(body) = node.child_by_field(Field::Body) else {
        return;
    };
    for statement in body.named_children() {
        if statement.kind() != NodeKind::AssignmentStatement {
            continue;
        }
        let (Some(left), Some(operator), Some(right)) = (
            statement.child_by_field(Field::Left),
            statement.child_by_field(Field::Operator),
            statement.child_by_field(Field::Right),
        ) else {
            continue;
        };
        let key = left.text().trim().to_string();
        let source = statement.text();
        let base = statement.start_byte();
        let spacing = PropertySpacing {
            before_equals: source[left.end_byte() - base..operator.start_byte() - base].to_string(),
            after_equals: source[operator.end_byte() - base..right.start_byte() - base].to_string(),
        };

        let value = property_value(&key, right, dialog_name, model, context);
        let Some(dialog) = model.dialogs.get_mut(dialog_name) else {
            return;
        };
        match value {
            LinkedValue::Plain(value) => {
                dialog.properties.insert(key.clone(), value);
            }
            LinkedValue::StringLiteral(value) => {
                dialog.formatting.string_literal_keys.insert(key.clone());
                dialog.properties.insert(key.clone(), value);
            }
            LinkedValue::Expression(text) => {
                dialog.formatting.expression_keys.insert(key.clone());
                dialog.properties.insert(key.clone(), PropertyValue::string(text));
            }
        }
        dialog.formatting.spacing.insert(key, spacing);
    }
}

enum LinkedValue {
    Plain(PropertyValue),
    StringLiteral(PropertyValue),
    Expression(String),
}

fn property_value(
    key: &str,
    value: Node<'_>,
    dialog_name: &str,
    model: &SemanticModel,
    context: &mut BuildContext,
) -> LinkedValue {
    let text = value.text().trim();
    match value.kind() {
        NodeKind::Number => match text.parse::<f64>() {
            Ok(number) => LinkedValue::Plain(PropertyValue::number(number)),
            Err(_) => LinkedValue::Expression(text.to_string()),
        },
        NodeKind::Boolean => {
            LinkedValue::Plain(PropertyValue::bool(text.eq_ignore_ascii_case("true")))
        }
        NodeKind::String => LinkedValue::StringLiteral(PropertyValue::string(
            dd_core::strip_outer_quotes(text),
        )),
        NodeKind::Identifier => match context.resolve_function(&model.functions, text) {
            Some(id) => {
                if key.eq_ignore_ascii_case("condition") {
                    context.mark_condition(id);
                } else if key.eq_ignore_ascii_case("information") {
                    context.link_information(id, dialog_name);
                }
                LinkedValue::Plain(PropertyValue::function(id))
            }
            None => {
                if key.eq_ignore_ascii_case("condition") || key.eq_ignore_ascii_case("information") {
                    debug!(dialog = dialog_name, key, target = text, "unresolved function reference");
                }
                LinkedValue::Expression(text.to_string())
            }
        },
        _ => LinkedValue::Expression(text.to_string()),
    }
}

fn analyze_function(
    node: Node<'_>,
    id: FunctionId,
    source: &str,
    model: &mut SemanticModel,
    context: &BuildContext,
) {
    let Some(body) = node.child_by_field(Field::Body).filter(|body| !body.is_missing()) else {
        return;
    };
    let children: Vec<Node<'_>> = body.named_children().collect();
    let calls: Vec<String> = body
        .descendants()
        .filter(|child| child.kind() == NodeKind::CallExpression)
        .filter_map(callee_name)
        .map(|name| name.trim().to_string())
        .collect();

    let analysis = if context.is_condition(id) {
        analyze_condition_body(&children, source)
    } else {
        BodyAnalysis {
            actions: body_actions(&children, source),
            ..BodyAnalysis::default()
        }
    };

    let Some(function) = model.functions.get_mut(id) else {
        return;
    };
    function.calls = calls;
    function.raw = analysis.raw;
    function.conditions = analysis.conditions;
    function.style.explicit_false_return = analysis.explicit_false_return;
    function.actions = analysis.actions;
    if let Some(trigger) = analysis.raw_trigger {
        debug!(function = %function.name, trigger, "condition body preserved verbatim");
    }
    trace!(
        function = %function.name,
        actions = function.actions.len(),
        conditions = function.conditions.len(),
        "analyzed function body"
    );

    let actions = function.actions.clone();
    if let Some(dialog) = context
        .dialog_for(id)
        .and_then(|dialog| model.dialogs.get_mut(dialog))
    {
        dialog.actions.extend(actions);
    }
}

#[derive(Debug, Default)]
struct BodyAnalysis {
    actions: Vec<Action>,
    conditions: Vec<Condition>,
    raw: bool,
    raw_trigger: Option<&'static str>,
    explicit_false_return: bool,
}

/// Classifies each statement in order. Standalone comments become raw comment
/// actions unless a dialog line on the same row already took them as its text.
fn body_actions(children: &[Node<'_>], source: &str) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut inline_row = None;
    for child in children.iter().copied() {
        if child.is_comment() {
            if inline_row.take() != Some(child.start_position().row) {
                actions.push(Action::raw(dedented_text(child, source)));
            }
            continue;
        }
        let action = action_for(child, source);
        inline_row = matches!(action, Action::DialogLine { inline_comment: true, .. })
            .then(|| child.end_position().row);
        actions.push(action);
    }
    actions
}

/// Accepts `if (conditions) { return TRUE; }` optionally followed by a final
/// `return FALSE;`, or a lone `return TRUE;`. Anything else switches the
/// body to raw mode, where every statement and comment is kept verbatim in
/// order. Outside raw mode, body comments are the only actions.
fn analyze_condition_body(children: &[Node<'_>], source: &str) -> BodyAnalysis {
    let statement_count = children.iter().filter(|child| !child.is_comment()).count();
    let last = statement_count.saturating_sub(1);
    let mut analysis = BodyAnalysis::default();
    let mut preserved: BTreeSet<ByteRange> = BTreeSet::new();
    let mut comments = Vec::new();
    let mut seen_if = false;
    let mut index = 0;

    for (position, statement) in children.iter().copied().enumerate() {
        if analysis.raw {
            preserve(statement, source, &mut preserved, &mut analysis.actions);
            continue;
        }
        if statement.is_comment() {
            comments.push(Action::raw(dedented_text(statement, source)));
            continue;
        }
        let accepted = match statement.kind() {
            NodeKind::IfStatement if !seen_if && is_canonical_if(statement) => {
                if let Some(condition) = statement.child_by_field(Field::Condition) {
                    collect_conditions(condition, &mut analysis.conditions);
                }
                seen_if = true;
                true
            }
            NodeKind::ReturnStatement if seen_if && index == last && returns_bool(statement, false) => {
                analysis.explicit_false_return = true;
                true
            }
            NodeKind::ReturnStatement if statement_count == 1 && returns_bool(statement, true) => true,
            _ => false,
        };
        index += 1;
        if !accepted {
            analysis.raw_trigger = Some(raw_trigger(statement, seen_if));
            analysis.raw = true;
            analysis.conditions.clear();
            analysis.explicit_false_return = false;
            for earlier in &children[..=position] {
                preserve(*earlier, source, &mut preserved, &mut analysis.actions);
            }
        }
    }
    if !analysis.raw {
        analysis.actions = comments;
    }
    analysis
}

fn raw_trigger(statement: Node<'_>, seen_if: bool) -> &'static str {
    match statement.kind() {
        NodeKind::IfStatement if statement.child_by_field(Field::Alternative).is_some() => {
            "else branch"
        }
        NodeKind::IfStatement if seen_if => "second if",
        NodeKind::IfStatement => "if body is not `return TRUE;`",
        NodeKind::ReturnStatement => "non-canonical return",
        _ => "unsupported statement",
    }
}

fn is_canonical_if(statement: Node<'_>) -> bool {
    if statement.child_by_field(Field::Alternative).is_some() {
        return false;
    }
    let Some(consequence) = statement.child_by_field(Field::Consequence) else {
        return false;
    };
    let mut body = consequence.named_children().filter(|child| !child.is_comment());
    matches!(
        (body.next(), body.next()),
        (Some(only), None) if only.kind() == NodeKind::ReturnStatement && returns_bool(only, true)
    )
}

fn returns_bool(statement: Node<'_>, expected: bool) -> bool {
    statement
        .named_children()
        .find(|child| !child.is_comment())
        .map(|value| {
            value.kind() == NodeKind::Boolean
                && value.text().eq_ignore_ascii_case(if expected { "true" } else { "false" })
        })
        .unwrap_or(false)
}

fn preserve(
    statement: Node<'_>,
    source: &str,
    preserved: &mut BTreeSet<ByteRange>,
    actions: &mut Vec<Action>,
) {
    if preserved.insert(statement.range()) {
        actions.push(Action::raw(dedented_text(statement, source)));
    }
}

fn action_for(statement: Node<'_>, source: &str) -> Action {
    match statement.kind() {
        NodeKind::ExpressionStatement => {
            let expression = statement.named_children().find(|child| !child.is_comment());
            if let Some(call) = expression.filter(|node| node.kind() == NodeKind::CallExpression) {
                if let Some(callee) = callee_name(call) {
                    return classify_action(call, callee.trim());
                }
            }
            Action::raw(dedented_text(statement, source))
        }
        NodeKind::AssignmentStatement => classify_assignment(statement)
            .unwrap_or_else(|| Action::raw(dedented_text(statement, source))),
        _ => Action::raw(dedented_text(statement, source)),
    }
}

/// Statement text with the indentation of its first line removed from every
/// following line.
pub(crate) fn dedented_text(statement: Node<'_>, source: &str) -> String {
    let text = statement.text().trim();
    let line_start = source[..statement.start_byte()]
        .rfind('\n')
        .map(|index| index + 1)
        .unwrap_or(0);
    let indent = &source[line_start..statement.start_byte()];
    if !indent.chars().all(|ch| ch == ' ' || ch == '\t') || !text.contains('\n') {
        return text.to_string();
    }
    text.lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line
            } else {
                line.strip_prefix(indent).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
