use dd_core::{invert_operator, is_comparison_operator, Condition, PrimitiveValue};
use dd_parser::{Field, Node, NodeKind};
use tracing::trace;

use crate::arguments::{argument_nodes, callee_name, normalize_argument};
use crate::literal::comparison_value;

/// Splits a top-level `&&` chain and classifies each operand.
pub fn collect_conditions(expression: Node<'_>, out: &mut Vec<Condition>) {
    let expression = unwrap_parentheses(expression);
    if expression.kind() == NodeKind::BinaryExpression && operator_text(expression) == Some("&&") {
        if let (Some(left), Some(right)) = (
            expression.child_by_field(Field::Left),
            expression.child_by_field(Field::Right),
        ) {
            collect_conditions(left, out);
            collect_conditions(right, out);
            return;
        }
    }
    out.push(classify_condition(expression));
}

/// Classifies one boolean expression, falling back to its source text.
pub fn classify_condition(expression: Node<'_>) -> Condition {
    classify_known(expression).unwrap_or_else(|| {
        trace!(expression = expression.text(), "expression kept as generic condition");
        Condition::generic(expression.text().trim())
    })
}

fn classify_known(expression: Node<'_>) -> Option<Condition> {
    match expression.kind() {
        NodeKind::ParenthesizedExpression => classify_known(unwrap_parentheses(expression)),
        NodeKind::Identifier | NodeKind::MemberAccess | NodeKind::ArrayAccess => {
            Some(variable(expression.text(), None))
        }
        NodeKind::CallExpression => classify_call(expression),
        NodeKind::UnaryExpression if operator_text(expression) == Some("!") => {
            let operand = expression.child_by_field(Field::Operand)?;
            classify_known(unwrap_parentheses(operand)).map(Condition::negate)
        }
        NodeKind::BinaryExpression => {
            let operator = operator_text(expression)?;
            if !is_comparison_operator(operator) {
                return None;
            }
            classify_comparison(
                expression.child_by_field(Field::Left)?,
                operator,
                expression.child_by_field(Field::Right)?,
            )
        }
        _ => None,
    }
}

fn classify_comparison(left: Node<'_>, operator: &str, right: Node<'_>) -> Option<Condition> {
    let left = unwrap_parentheses(left);
    let right = unwrap_parentheses(right);
    if let Some(condition) = compare_call(left, operator, right) {
        return Some(condition);
    }
    if let Some(condition) = compare_call(right, invert_operator(operator), left) {
        return Some(condition);
    }
    if is_symbol(left) {
        return Some(variable(
            left.text(),
            Some((operator.to_string(), comparison_value(right))),
        ));
    }
    if is_symbol(right) {
        return Some(variable(
            right.text(),
            Some((invert_operator(operator).to_string(), comparison_value(left))),
        ));
    }
    None
}

/// `call op value` where `call` is a known NPC query. Boolean queries fold a
/// comparison against TRUE or FALSE into their negation flag.
fn compare_call(call: Node<'_>, operator: &str, value: Node<'_>) -> Option<Condition> {
    if call.kind() != NodeKind::CallExpression {
        return None;
    }
    let condition = classify_call(call)?;
    match condition {
        Condition::NpcKnowsInfo { .. } | Condition::NpcIsInState { .. } | Condition::NpcIsDead { .. } => {
            if value.kind() != NodeKind::Boolean {
                return None;
            }
            let expected = value.text().eq_ignore_ascii_case("true");
            match operator {
                "==" if expected => Some(condition),
                "==" => Some(condition.negate()),
                "!=" if expected => Some(condition.negate()),
                "!=" => Some(condition),
                _ => None,
            }
        }
        Condition::NpcHasItems { npc, item, .. } => Some(Condition::NpcHasItems {
            npc,
            item,
            operator: Some(operator.to_string()),
            value: Some(comparison_value(value)),
            negated: false,
        }),
        Condition::NpcGetDistToWp { npc, waypoint, .. } => Some(Condition::NpcGetDistToWp {
            npc,
            waypoint,
            operator: Some(operator.to_string()),
            value: Some(comparison_value(value)),
            negated: false,
        }),
        Condition::NpcGetTalentSkill { npc, talent, .. } => Some(Condition::NpcGetTalentSkill {
            npc,
            talent,
            operator: Some(operator.to_string()),
            value: Some(comparison_value(value)),
            negated: false,
        }),
        _ => None,
    }
}

fn classify_call(call: Node<'_>) -> Option<Condition> {
    let callee = callee_name(call)?;
    let args = argument_nodes(call);
    let text = |index: usize| normalize_argument(args[index]);
    match callee.to_ascii_lowercase().as_str() {
        "npc_knowsinfo" if args.len() == 2 => Some(Condition::NpcKnowsInfo {
            npc: text(0),
            dialog_ref: text(1),
            negated: false,
        }),
        "npc_hasitems" if args.len() == 2 => Some(Condition::NpcHasItems {
            npc: text(0),
            item: text(1),
            operator: None,
            value: None,
            negated: false,
        }),
        "npc_isinstate" if args.len() == 2 => Some(Condition::NpcIsInState {
            npc: text(0),
            state: text(1),
            negated: false,
        }),
        "npc_isdead" if args.len() == 1 => Some(Condition::NpcIsDead {
            npc: text(0),
            negated: false,
        }),
        "npc_getdisttowp" if args.len() == 2 => Some(Condition::NpcGetDistToWp {
            npc: text(0),
            waypoint: args[1].text().trim().to_string(),
            operator: None,
            value: None,
            negated: false,
        }),
        "npc_gettalentskill" if args.len() == 2 => Some(Condition::NpcGetTalentSkill {
            npc: text(0),
            talent: text(1),
            operator: None,
            value: None,
            negated: false,
        }),
        _ => None,
    }
}

fn variable(name: &str, comparison: Option<(String, PrimitiveValue)>) -> Condition {
    let (operator, value) = match comparison {
        Some((operator, value)) => (Some(operator), Some(value)),
        None => (None, None),
    };
    Condition::Variable {
        variable_name: name.trim().to_string(),
        negated: false,
        operator,
        value,
    }
}

fn is_symbol(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        NodeKind::Identifier | NodeKind::MemberAccess | NodeKind::ArrayAccess
    )
}

fn operator_text<'t>(node: Node<'t>) -> Option<&'t str> {
    node.child_by_field(Field::Operator).map(|operator| operator.text())
}

fn unwrap_parentheses(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == NodeKind::ParenthesizedExpression {
        match node.named_children().find(|child| !child.is_comment()) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

#[cfg(test)]
mod conditions_tests {
    use super::*;
    use dd_parser::parse;

    fn conditions_of(expression: &str) -> Vec<Condition> {
        let source = format!("func int F()\n{{\n\tif ({})\n\t{{\n\t\treturn TRUE;\n\t}};\n}};\n", expression);
        let tree = parse(&source);
        let if_statement = tree
            .root()
            .descendants()
            .find(|node| node.kind() == NodeKind::IfStatement)
            .expect("if statement should exist");
        let condition = if_statement
            .child_by_field(Field::Condition)
            .expect("condition should exist");
        let mut out = Vec::new();
        collect_conditions(condition, &mut out);
        out
    }

    #[test]
    fn splits_conjunctions_into_classified_conditions() {
        let conditions = conditions_of("Npc_KnowsInfo (other, DIA_A) && !MIS_Done && (Kapitel >= 2)");
        assert_eq!(conditions.len(), 3);
        assert_eq!(
            conditions[0],
            Condition::NpcKnowsInfo {
                npc: "other".to_string(),
                dialog_ref: "DIA_A".to_string(),
                negated: false,
            }
        );
        assert_eq!(
            conditions[1],
            Condition::Variable {
                variable_name: "MIS_Done".to_string(),
                negated: true,
                operator: None,
                value: None,
            }
        );
        assert_eq!(
            conditions[2],
            Condition::Variable {
                variable_name: "Kapitel".to_string(),
                negated: false,
                operator: Some(">=".to_string()),
                value: Some(PrimitiveValue::Number(2.0)),
            }
        );
    }

    #[test]
    fn swapped_operands_keep_the_symbol_on_the_left() {
        let conditions = conditions_of("2 < Kapitel");
        assert_eq!(conditions[0].render(), "Kapitel > 2");
        let conditions = conditions_of("0 < Npc_HasItems (other, ItMi_Gold)");
        assert_eq!(conditions[0].render(), "Npc_HasItems (other, ItMi_Gold) > 0");

        let left = conditions_of("5 > Npc_GetTalentSkill (other, NPC_TALENT_1H)");
        let right = conditions_of("Npc_GetTalentSkill (other, NPC_TALENT_1H) < 5");
        assert_eq!(left, right);
        assert_eq!(left[0].type_name(), "NpcGetTalentSkillCondition");
    }

    #[test]
    fn boolean_queries_fold_comparisons_into_negation() {
        let conditions = conditions_of("Npc_KnowsInfo (other, DIA_A) == FALSE");
        assert!(conditions[0].is_negated());
        assert_eq!(conditions[0].render(), "!Npc_KnowsInfo (other, DIA_A)");
        let conditions = conditions_of("Npc_IsDead (Bandit) != FALSE");
        assert!(!conditions[0].is_negated());
    }

    #[test]
    fn disjunctions_stay_generic() {
        let conditions = conditions_of("Kapitel == 2 || Kapitel == 3");
        assert_eq!(conditions, vec![Condition::generic("Kapitel == 2 || Kapitel == 3")]);
        assert!(conditions[0].needs_grouping());
    }

    #[test]
    fn comparison_values_keep_non_numeric_text() {
        let conditions = conditions_of("other.guild == GIL_SLD && Npc_GetDistToWP (self, \"WP_A\") < 500");
        assert_eq!(conditions[0].render(), "other.guild == GIL_SLD");
        assert_eq!(
            conditions[1].render(),
            "Npc_GetDistToWP (self, \"WP_A\") < 500"
        );
    }

    #[test]
    fn unknown_calls_are_generic() {
        let conditions = conditions_of("Wld_IsTime (8, 0, 20, 0)");
        assert_eq!(conditions, vec![Condition::generic("Wld_IsTime (8, 0, 20, 0)")]);
    }
}
