use serde::{Deserialize, Serialize};

use crate::value::quote;

/// A classified effect statement inside a function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// `AI_Output (speaker, listener, "ID");`. `text` is the trailing comment
    /// when one was present, otherwise the id.
    #[serde(rename_all = "camelCase")]
    DialogLine {
        speaker: String,
        listener: String,
        text: String,
        id: String,
        #[serde(default)]
        inline_comment: bool,
    },
    #[serde(rename_all = "camelCase")]
    Choice {
        dialog_ref: String,
        text: String,
        target_function: String,
        #[serde(default)]
        text_is_expression: bool,
    },
    #[serde(rename_all = "camelCase")]
    CreateTopic {
        topic: String,
        #[serde(default)]
        topic_type: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    LogEntry {
        topic: String,
        text: String,
        #[serde(default)]
        text_is_expression: bool,
    },
    #[serde(rename_all = "camelCase")]
    LogSetTopicStatus { topic: String, status: String },
    #[serde(rename = "CreateInventoryItems", rename_all = "camelCase")]
    CreateItems {
        target: String,
        item: String,
        quantity: i64,
    },
    #[serde(rename = "GiveInventoryItems", rename_all = "camelCase")]
    GiveItems {
        giver: String,
        receiver: String,
        item: String,
        quantity: i64,
    },
    #[serde(rename = "AttackAction", rename_all = "camelCase")]
    Attack {
        attacker: String,
        target: String,
        attack_reason: String,
        damage: i64,
    },
    #[serde(rename = "SetAttitudeAction", rename_all = "camelCase")]
    SetAttitude { target: String, attitude: String },
    #[serde(rename = "ExchangeRoutineAction", rename_all = "camelCase")]
    ExchangeRoutine { target: String, routine: String },
    #[serde(rename = "ChapterTransitionAction", rename_all = "camelCase")]
    ChapterTransition { chapter: i64, world: String },
    #[serde(rename = "StopProcessInfosAction", rename_all = "camelCase")]
    StopProcessInfos { target: String },
    #[serde(rename = "PlayAniAction", rename_all = "camelCase")]
    PlayAni {
        target: String,
        animation_name: String,
    },
    #[serde(rename = "SetVariableAction", rename_all = "camelCase")]
    SetVariable {
        variable_name: String,
        operator: String,
        value: String,
    },
    /// Unclassified statement, kept as its exact trimmed source text.
    #[serde(rename = "Action")]
    Raw { action: String },
}

impl Action {
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw {
            action: text.into(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::DialogLine { .. } => "DialogLine",
            Self::Choice { .. } => "Choice",
            Self::CreateTopic { .. } => "CreateTopic",
            Self::LogEntry { .. } => "LogEntry",
            Self::LogSetTopicStatus { .. } => "LogSetTopicStatus",
            Self::CreateItems { .. } => "CreateInventoryItems",
            Self::GiveItems { .. } => "GiveInventoryItems",
            Self::Attack { .. } => "AttackAction",
            Self::SetAttitude { .. } => "SetAttitudeAction",
            Self::ExchangeRoutine { .. } => "ExchangeRoutineAction",
            Self::ChapterTransition { .. } => "ChapterTransitionAction",
            Self::StopProcessInfos { .. } => "StopProcessInfosAction",
            Self::PlayAni { .. } => "PlayAniAction",
            Self::SetVariable { .. } => "SetVariableAction",
            Self::Raw { .. } => "Action",
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Raw { action } => Some(action),
            _ => None,
        }
    }

    /// A raw action holding only a `//` or `/* */` comment from a body.
    pub fn is_comment(&self) -> bool {
        match self {
            Self::Raw { action } => {
                let text = action.trim();
                (text.starts_with("//") && !text.contains('\n'))
                    || (text.starts_with("/*") && text.ends_with("*/"))
            }
            _ => false,
        }
    }

    /// Canonical call syntax, terminated with `;`. Raw actions may span
    /// several lines.
    pub fn render(&self, include_comments: bool) -> String {
        match self {
            Self::DialogLine {
                speaker,
                listener,
                text,
                id,
                inline_comment,
            } => {
                let call = format!("AI_Output ({}, {}, {});", speaker, listener, quote(id));
                if include_comments && (*inline_comment || text != id) {
                    format!("{} //{}", call, text)
                } else {
                    call
                }
            }
            Self::Choice {
                dialog_ref,
                text,
                target_function,
                text_is_expression,
            } => format!(
                "Info_AddChoice ({}, {}, {});",
                dialog_ref,
                text_argument(text, *text_is_expression),
                target_function
            ),
            Self::CreateTopic { topic, topic_type } => match topic_type {
                Some(topic_type) => format!("Log_CreateTopic ({}, {});", topic, topic_type),
                None => format!("Log_CreateTopic ({});", topic),
            },
            Self::LogEntry {
                topic,
                text,
                text_is_expression,
            } => format!(
                "B_LogEntry ({}, {});",
                topic,
                text_argument(text, *text_is_expression)
            ),
            Self::LogSetTopicStatus { topic, status } => {
                format!("Log_SetTopicStatus ({}, {});", topic, status)
            }
            Self::CreateItems {
                target,
                item,
                quantity,
            } => format!("CreateInvItems ({}, {}, {});", target, item, quantity),
            Self::GiveItems {
                giver,
                receiver,
                item,
                quantity,
            } => format!(
                "B_GiveInvItems ({}, {}, {}, {});",
                giver, receiver, item, quantity
            ),
            Self::Attack {
                attacker,
                target,
                attack_reason,
                damage,
            } => format!(
                "B_Attack ({}, {}, {}, {});",
                attacker, target, attack_reason, damage
            ),
            Self::SetAttitude { target, attitude } => {
                format!("B_SetAttitude ({}, {});", target, attitude)
            }
            Self::ExchangeRoutine { target, routine } => {
                format!("Npc_ExchangeRoutine ({}, {});", target, quote(routine))
            }
            Self::ChapterTransition { chapter, world } => {
                format!("B_Kapitelwechsel ({}, {});", chapter, world)
            }
            Self::StopProcessInfos { target } => format!("AI_StopProcessInfos ({});", target),
            Self::PlayAni {
                target,
                animation_name,
            } => format!("AI_PlayAni ({}, {});", target, quote(animation_name)),
            Self::SetVariable {
                variable_name,
                operator,
                value,
            } => format!("{} {} {};", variable_name, operator, value),
            Self::Raw { action } => {
                let code = action.trim();
                if code.ends_with(';') || self.is_comment() {
                    code.to_string()
                } else {
                    format!("{};", code)
                }
            }
        }
    }

    /// Short human-readable summary used by listings.
    pub fn display(&self) -> String {
        match self {
            Self::DialogLine { speaker, text, .. } => {
                format!("[DialogLine: {} -> \"{}\"]", speaker, text.trim())
            }
            Self::Choice {
                text,
                target_function,
                ..
            } => format!("[Choice: \"{}\" -> {}]", text, target_function),
            Self::CreateTopic { topic, topic_type } => match topic_type {
                Some(topic_type) => format!("[CreateTopic: {}, {}]", topic, topic_type),
                None => format!("[CreateTopic: {}]", topic),
            },
            Self::LogEntry { topic, text, .. } => format!("[LogEntry: {} -> \"{}\"]", topic, text),
            Self::LogSetTopicStatus { topic, status } => {
                format!("[LogSetTopicStatus: {} -> {}]", topic, status)
            }
            Self::CreateItems {
                target,
                item,
                quantity,
            } => format!("[CreateItems: {} gets {}x {}]", target, quantity, item),
            Self::GiveItems {
                giver,
                receiver,
                item,
                quantity,
            } => format!(
                "[GiveItems: {} gives {} {}x {}]",
                giver, receiver, quantity, item
            ),
            Self::Attack {
                attacker,
                target,
                attack_reason,
                damage,
            } => format!(
                "[Attack: {} attacks {} ({}, dmg:{})]",
                attacker, target, attack_reason, damage
            ),
            Self::SetAttitude { target, attitude } => {
                format!("[SetAttitude: {} -> {}]", target, attitude)
            }
            Self::ExchangeRoutine { target, routine } => {
                format!("[ExchangeRoutine: {} -> \"{}\"]", target, routine)
            }
            Self::ChapterTransition { chapter, world } => {
                format!("[ChapterTransition: Chapter {} in {}]", chapter, world)
            }
            Self::StopProcessInfos { target } => format!("[StopProcessInfos: {}]", target),
            Self::PlayAni {
                target,
                animation_name,
            } => format!("[PlayAni: {} plays \"{}\"]", target, animation_name),
            Self::SetVariable {
                variable_name,
                operator,
                value,
            } => format!("[SetVariable: {} {} {}]", variable_name, operator, value),
            Self::Raw { action } => format!("[Action: {}]", action),
        }
    }
}

fn text_argument(text: &str, is_expression: bool) -> String {
    if is_expression {
        text.to_string()
    } else {
        quote(text)
    }
}

#[cfg(test)]
mod action_tests {
    use super::*;

    fn line(text: &str, inline_comment: bool) -> Action {
        Action::DialogLine {
            speaker: "self".to_string(),
            listener: "other".to_string(),
            text: text.to_string(),
            id: "DIA_X_15_00".to_string(),
            inline_comment,
        }
    }

    #[test]
    fn dialog_line_emits_comment_only_when_text_differs_or_was_inline() {
        assert_eq!(
            line("Hi", true).render(true),
            "AI_Output (self, other, \"DIA_X_15_00\"); //Hi"
        );
        assert_eq!(
            line("DIA_X_15_00", false).render(true),
            "AI_Output (self, other, \"DIA_X_15_00\");"
        );
        assert_eq!(
            line("Hi", true).render(false),
            "AI_Output (self, other, \"DIA_X_15_00\");"
        );
    }

    #[test]
    fn choice_quotes_text_unless_expression() {
        let literal = Action::Choice {
            dialog_ref: "DIA_X".to_string(),
            text: "Bye".to_string(),
            target_function: "DIA_X_Info".to_string(),
            text_is_expression: false,
        };
        assert_eq!(
            literal.render(true),
            "Info_AddChoice (DIA_X, \"Bye\", DIA_X_Info);"
        );

        let expression = Action::Choice {
            dialog_ref: "DIA_X".to_string(),
            text: "DIALOG_BACK".to_string(),
            target_function: "DIA_X_Back".to_string(),
            text_is_expression: true,
        };
        assert_eq!(
            expression.render(true),
            "Info_AddChoice (DIA_X, DIALOG_BACK, DIA_X_Back);"
        );
    }

    #[test]
    fn raw_action_gets_terminator_once() {
        assert_eq!(Action::raw("Wld_InsertNpc(X, \"WP\")").render(true), "Wld_InsertNpc(X, \"WP\");");
        assert_eq!(Action::raw("  foo();  ").render(true), "foo();");
        assert_eq!(Action::raw("x").type_name(), "Action");
    }

    #[test]
    fn comment_actions_render_without_terminator() {
        let line = Action::raw("//AI_Output (self, other, \"DIA_A_Hallo_01_01\"); //old line");
        assert!(line.is_comment());
        assert_eq!(
            line.render(true),
            "//AI_Output (self, other, \"DIA_A_Hallo_01_01\"); //old line"
        );
        let block = Action::raw("/* first\n   second */");
        assert!(block.is_comment());
        assert_eq!(block.render(true), "/* first\n   second */");
        assert!(!Action::raw("B = 1; // note").is_comment());
        assert!(!Action::raw("// a\nB = 1").is_comment());
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = Action::CreateItems {
            target: "self".to_string(),
            item: "ItMi_Gold".to_string(),
            quantity: 50,
        };
        let json = serde_json::to_value(&action).expect("action should serialize");
        assert_eq!(json["type"], "CreateInventoryItems");
        assert_eq!(json["quantity"], 50);

        let raw: Action = serde_json::from_str("{\"type\":\"Action\",\"action\":\"foo();\"}")
            .expect("raw action should parse");
        assert_eq!(raw, Action::raw("foo();"));
    }

    #[test]
    fn display_strings_are_readable() {
        assert_eq!(line("Hi", true).display(), "[DialogLine: self -> \"Hi\"]");
        let give = Action::GiveItems {
            giver: "other".to_string(),
            receiver: "self".to_string(),
            item: "ItMi_Gold".to_string(),
            quantity: 5,
        };
        assert_eq!(give.display(), "[GiveItems: other gives self 5x ItMi_Gold]");
        assert_eq!(give.type_name(), "GiveInventoryItems");
    }
}
