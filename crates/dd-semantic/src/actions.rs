use dd_core::Action;
use dd_parser::{Node, NodeKind};
use tracing::trace;

use crate::arguments::{argument_nodes, normalize_argument};
use crate::literal::{comment_text, integer_value};

/// Sibling distance searched for the comment that carries a dialog line.
const COMMENT_SEARCH_LIMIT: usize = 5;

/// Classifies a top-level call. Unknown callees, wrong arities and
/// non-literal numeric or id arguments fall back to a raw action.
pub fn classify_action(call: Node<'_>, callee: &str) -> Action {
    match classify_known_call(call, callee) {
        Some(action) => action,
        None => {
            trace!(callee, "call kept as generic action");
            Action::raw(call.text().trim())
        }
    }
}

fn classify_known_call(call: Node<'_>, callee: &str) -> Option<Action> {
    let args = argument_nodes(call);
    let text = |index: usize| normalize_argument(args[index]);
    match callee.to_ascii_lowercase().as_str() {
        "ai_output" if args.len() == 3 => {
            if args[2].kind() != NodeKind::String {
                return None;
            }
            let id = text(2);
            let comment = trailing_comment(call);
            Some(Action::DialogLine {
                speaker: text(0),
                listener: text(1),
                inline_comment: comment.is_some(),
                text: comment.unwrap_or_else(|| id.clone()),
                id,
            })
        }
        "info_addchoice" if args.len() == 3 => {
            let (text_value, text_is_expression) = text_argument(args[1]);
            Some(Action::Choice {
                dialog_ref: text(0),
                text: text_value,
                target_function: text(2),
                text_is_expression,
            })
        }
        "log_createtopic" if args.len() == 1 || args.len() == 2 => Some(Action::CreateTopic {
            topic: text(0),
            topic_type: args.get(1).map(|node| normalize_argument(*node)),
        }),
        "b_logentry" | "log_addentry" if args.len() == 2 => {
            let (text_value, text_is_expression) = text_argument(args[1]);
            Some(Action::LogEntry {
                topic: text(0),
                text: text_value,
                text_is_expression,
            })
        }
        "log_settopicstatus" if args.len() == 2 => Some(Action::LogSetTopicStatus {
            topic: text(0),
            status: text(1),
        }),
        "createinvitems" if args.len() == 3 => Some(Action::CreateItems {
            target: text(0),
            item: text(1),
            quantity: integer_value(args[2])?,
        }),
        "b_giveinvitems" if args.len() == 4 => Some(Action::GiveItems {
            giver: text(0),
            receiver: text(1),
            item: text(2),
            quantity: integer_value(args[3])?,
        }),
        "b_attack" if args.len() == 4 => Some(Action::Attack {
            attacker: text(0),
            target: text(1),
            attack_reason: text(2),
            damage: integer_value(args[3])?,
        }),
        "b_setattitude" if args.len() == 2 => Some(Action::SetAttitude {
            target: text(0),
            attitude: text(1),
        }),
        "npc_exchangeroutine" if args.len() == 2 && args[1].kind() == NodeKind::String => {
            Some(Action::ExchangeRoutine {
                target: text(0),
                routine: text(1),
            })
        }
        "b_kapitelwechsel" if args.len() == 2 => Some(Action::ChapterTransition {
            chapter: integer_value(args[0])?,
            world: text(1),
        }),
        "ai_stopprocessinfos" if args.len() == 1 => Some(Action::StopProcessInfos { target: text(0) }),
        "ai_playani" if args.len() == 2 && args[1].kind() == NodeKind::String => {
            Some(Action::PlayAni {
                target: text(0),
                animation_name: text(1),
            })
        }
        _ => None,
    }
}

/// Text argument of a choice or log entry, and whether it was an expression
/// rather than a string literal.
fn text_argument(node: Node<'_>) -> (String, bool) {
    if node.kind() == NodeKind::String {
        (normalize_argument(node), false)
    } else {
        (node.text().trim().to_string(), true)
    }
}

/// Comment on the same line after the statement holding `call`.
pub fn trailing_comment(call: Node<'_>) -> Option<String> {
    let statement = call
        .parent()
        .filter(|parent| parent.kind() == NodeKind::ExpressionStatement)?;
    let line = statement.end_position().row;
    let mut sibling = statement.next_sibling();
    for _ in 0..COMMENT_SEARCH_LIMIT {
        let node = sibling?;
        if node.is_comment() {
            return (node.start_position().row == line).then(|| comment_text(node));
        }
        let kind = node.kind();
        if kind.is_statement()
            || kind.is_declaration()
            || kind == NodeKind::Block
            || kind == NodeKind::Token("}")
        {
            return None;
        }
        sibling = node.next_sibling();
    }
    None
}

/// `name op value` assignment as a variable action; the value keeps its
/// source text.
pub fn classify_assignment(statement: Node<'_>) -> Option<Action> {
    use dd_parser::Field;

    let left = statement.child_by_field(Field::Left)?;
    let operator = statement.child_by_field(Field::Operator)?;
    let right = statement.child_by_field(Field::Right)?;
    Some(Action::SetVariable {
        variable_name: left.text().trim().to_string(),
        operator: operator.text().to_string(),
        value: right.text().trim().to_string(),
    })
}
