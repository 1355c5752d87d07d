use serde::{Deserialize, Serialize};

use crate::value::PrimitiveValue;

/// A classified boolean-context expression inside a condition function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    /// `name`, `!name` or `name <op> value`; the variable is always the
    /// left-hand symbol.
    #[serde(rename = "VariableCondition", rename_all = "camelCase")]
    Variable {
        variable_name: String,
        #[serde(default)]
        negated: bool,
        #[serde(default)]
        operator: Option<String>,
        #[serde(default)]
        value: Option<PrimitiveValue>,
    },
    #[serde(rename = "NpcKnowsInfoCondition", rename_all = "camelCase")]
    NpcKnowsInfo {
        npc: String,
        dialog_ref: String,
        #[serde(default)]
        negated: bool,
    },
    #[serde(rename = "NpcHasItemsCondition", rename_all = "camelCase")]
    NpcHasItems {
        npc: String,
        item: String,
        #[serde(default)]
        operator: Option<String>,
        #[serde(default)]
        value: Option<PrimitiveValue>,
        #[serde(default)]
        negated: bool,
    },
    #[serde(rename = "NpcIsInStateCondition", rename_all = "camelCase")]
    NpcIsInState {
        npc: String,
        state: String,
        #[serde(default)]
        negated: bool,
    },
    #[serde(rename = "NpcIsDeadCondition", rename_all = "camelCase")]
    NpcIsDead {
        npc: String,
        #[serde(default)]
        negated: bool,
    },
    #[serde(rename = "NpcGetDistToWpCondition", rename_all = "camelCase")]
    NpcGetDistToWp {
        npc: String,
        waypoint: String,
        #[serde(default)]
        operator: Option<String>,
        #[serde(default)]
        value: Option<PrimitiveValue>,
        #[serde(default)]
        negated: bool,
    },
    #[serde(rename = "NpcGetTalentSkillCondition", rename_all = "camelCase")]
    NpcGetTalentSkill {
        npc: String,
        talent: String,
        #[serde(default)]
        operator: Option<String>,
        #[serde(default)]
        value: Option<PrimitiveValue>,
        #[serde(default)]
        negated: bool,
    },
    /// Unclassified expression, kept as its exact trimmed source text.
    #[serde(rename = "Condition")]
    Generic { condition: String },
}

impl Condition {
    pub fn generic(text: impl Into<String>) -> Self {
        Self::Generic {
            condition: text.into(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Variable { .. } => "VariableCondition",
            Self::NpcKnowsInfo { .. } => "NpcKnowsInfoCondition",
            Self::NpcHasItems { .. } => "NpcHasItemsCondition",
            Self::NpcIsInState { .. } => "NpcIsInStateCondition",
            Self::NpcIsDead { .. } => "NpcIsDeadCondition",
            Self::NpcGetDistToWp { .. } => "NpcGetDistToWpCondition",
            Self::NpcGetTalentSkill { .. } => "NpcGetTalentSkillCondition",
            Self::Generic { .. } => "Condition",
        }
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Self::Variable { negated, .. }
            | Self::NpcKnowsInfo { negated, .. }
            | Self::NpcHasItems { negated, .. }
            | Self::NpcIsInState { negated, .. }
            | Self::NpcIsDead { negated, .. }
            | Self::NpcGetDistToWp { negated, .. }
            | Self::NpcGetTalentSkill { negated, .. } => *negated,
            Self::Generic { .. } => false,
        }
    }

    /// Flips the negation flag. Generic conditions are wrapped in `!( )`.
    pub fn negate(self) -> Self {
        match self {
            Self::Generic { condition } => Self::Generic {
                condition: format!("!({})", condition.trim()),
            },
            mut other => {
                match &mut other {
                    Self::Variable { negated, .. }
                    | Self::NpcKnowsInfo { negated, .. }
                    | Self::NpcHasItems { negated, .. }
                    | Self::NpcIsInState { negated, .. }
                    | Self::NpcIsDead { negated, .. }
                    | Self::NpcGetDistToWp { negated, .. }
                    | Self::NpcGetTalentSkill { negated, .. } => *negated = !*negated,
                    Self::Generic { .. } => {}
                }
                other
            }
        }
    }

    /// Canonical expression syntax, without a trailing `;`.
    pub fn render(&self) -> String {
        match self {
            Self::Variable {
                variable_name,
                negated,
                operator,
                value,
            } => with_comparison(variable_name.clone(), operator, value, *negated),
            Self::NpcKnowsInfo {
                npc,
                dialog_ref,
                negated,
            } => with_comparison(
                format!("Npc_KnowsInfo ({}, {})", npc, dialog_ref),
                &None,
                &None,
                *negated,
            ),
            Self::NpcHasItems {
                npc,
                item,
                operator,
                value,
                negated,
            } => with_comparison(
                format!("Npc_HasItems ({}, {})", npc, item),
                operator,
                value,
                *negated,
            ),
            Self::NpcIsInState {
                npc,
                state,
                negated,
            } => with_comparison(
                format!("Npc_IsInState ({}, {})", npc, state),
                &None,
                &None,
                *negated,
            ),
            Self::NpcIsDead { npc, negated } => {
                with_comparison(format!("Npc_IsDead ({})", npc), &None, &None, *negated)
            }
            Self::NpcGetDistToWp {
                npc,
                waypoint,
                operator,
                value,
                negated,
            } => with_comparison(
                format!("Npc_GetDistToWP ({}, {})", npc, waypoint),
                operator,
                value,
                *negated,
            ),
            Self::NpcGetTalentSkill {
                npc,
                talent,
                operator,
                value,
                negated,
            } => with_comparison(
                format!("Npc_GetTalentSkill ({}, {})", npc, talent),
                operator,
                value,
                *negated,
            ),
            Self::Generic { condition } => condition.trim().to_string(),
        }
    }

    /// True when the rendered text has a top-level `||` and must be
    /// parenthesized before being conjoined with `&&`.
    pub fn needs_grouping(&self) -> bool {
        match self {
            Self::Generic { condition } => has_top_level_or(condition),
            _ => false,
        }
    }

    pub fn display(&self) -> String {
        let prefix = if self.is_negated() { "not " } else { "" };
        match self {
            Self::Variable { variable_name, .. } => {
                format!("[Variable: {}{}]", prefix, self.render_unnegated(variable_name))
            }
            Self::NpcKnowsInfo {
                npc, dialog_ref, ..
            } => format!("[NpcKnowsInfo: {} {}knows {}]", npc, prefix, dialog_ref),
            Self::NpcHasItems { npc, item, .. } => format!(
                "[NpcHasItems: {}{} has {}{}]",
                prefix,
                npc,
                item,
                self.comparison_suffix()
            ),
            Self::NpcIsInState { npc, state, .. } => {
                format!("[NpcIsInState: {}{} in {}]", prefix, npc, state)
            }
            Self::NpcIsDead { npc, .. } => format!("[NpcIsDead: {}{}]", prefix, npc),
            Self::NpcGetDistToWp { npc, waypoint, .. } => format!(
                "[NpcGetDistToWp: {}{} to {}{}]",
                prefix,
                npc,
                waypoint,
                self.comparison_suffix()
            ),
            Self::NpcGetTalentSkill { npc, talent, .. } => format!(
                "[NpcGetTalentSkill: {}{} {}{}]",
                prefix,
                npc,
                talent,
                self.comparison_suffix()
            ),
            Self::Generic { condition } => format!("[Condition: {}]", condition.trim()),
        }
    }

    fn render_unnegated(&self, name: &str) -> String {
        format!("{}{}", name, self.comparison_suffix())
    }

    fn comparison_suffix(&self) -> String {
        match self {
            Self::Variable {
                operator: Some(operator),
                value: Some(value),
                ..
            }
            | Self::NpcHasItems {
                operator: Some(operator),
                value: Some(value),
                ..
            }
            | Self::NpcGetDistToWp {
                operator: Some(operator),
                value: Some(value),
                ..
            }
            | Self::NpcGetTalentSkill {
                operator: Some(operator),
                value: Some(value),
                ..
            } => format!(" {} {}", operator, value.render_raw()),
            _ => String::new(),
        }
    }
}

fn with_comparison(
    subject: String,
    operator: &Option<String>,
    value: &Option<PrimitiveValue>,
    negated: bool,
) -> String {
    match (operator, value, negated) {
        (Some(operator), Some(value), false) => {
            format!("{} {} {}", subject, operator, value.render_raw())
        }
        (Some(operator), Some(value), true) => {
            format!("!({} {} {})", subject, operator, value.render_raw())
        }
        (_, _, true) => format!("!{}", subject),
        (_, _, false) => subject,
    }
}

/// Mirrors a relational operator so that `a op b` equals `b op' a`.
pub fn invert_operator(operator: &str) -> &str {
    match operator {
        "<" => ">",
        ">" => "<",
        "<=" => ">=",
        ">=" => "<=",
        other => other,
    }
}

pub fn is_comparison_operator(operator: &str) -> bool {
    matches!(operator, "==" | "!=" | "<" | ">" | "<=" | ">=")
}

fn has_top_level_or(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        if in_string {
            if byte == b'\\' {
                index += 1;
            } else if byte == b'"' {
                in_string = false;
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'|' if depth == 0 && bytes.get(index + 1) == Some(&b'|') => return true,
                _ => {}
            }
        }
        index += 1;
    }
    false
}
