use std::collections::BTreeSet;

use dd_core::{
    Action, Condition, DaedalusError, DialogInstance, PrimitiveValue, PropertyValue,
    ScriptFunction, SemanticModel,
};
use serde::Serialize;

/// Number of dialog lines shown in a dialog preview.
const PREVIEW_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyView {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionView {
    pub name: String,
    pub return_type: String,
    pub raw: bool,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub calls: Vec<String>,
}

impl FunctionView {
    fn of(function: &ScriptFunction) -> Self {
        Self {
            name: function.name.clone(),
            return_type: function.return_type.clone(),
            raw: function.raw,
            conditions: function.conditions.clone(),
            actions: function.actions.clone(),
            calls: function.calls.clone(),
        }
    }
}

/// A dialog with its linked functions inlined by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub name: String,
    pub parent_type: String,
    pub npc: Option<String>,
    pub nr: Option<f64>,
    pub description: Option<String>,
    pub permanent: Option<bool>,
    pub properties: Vec<PropertyView>,
    pub condition: Option<FunctionView>,
    pub information: Option<FunctionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcView {
    pub name: String,
    pub parent_type: String,
    pub display_name: Option<String>,
    pub source_text: Option<String>,
    pub dialogs: Vec<DialogView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogLinePreview {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogSummary {
    pub name: String,
    pub npc: Option<String>,
    pub nr: Option<f64>,
    pub description: Option<String>,
    pub permanent: Option<bool>,
    pub lines: usize,
    pub choices: usize,
    pub has_actions: bool,
    pub preview: Vec<DialogLinePreview>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcSummary {
    pub name: String,
    pub parent_type: String,
    pub display_name: Option<String>,
    pub dialog_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub npcs: usize,
    pub dialogs: usize,
    /// Distinct `npc` values referenced by dialogs.
    pub dialog_npcs: Vec<String>,
    /// Functions linked from a dialog property.
    pub related_functions: usize,
}

/// Property value as it appears in source; function links show the
/// function name.
pub fn render_property(model: &SemanticModel, value: &PropertyValue) -> String {
    match value {
        PropertyValue::Function { function } => model
            .functions
            .get(*function)
            .map(|target| target.name.clone())
            .unwrap_or_else(|| format!("#{}", function.0)),
        PropertyValue::Primitive(primitive) => primitive.render_raw(),
    }
}

fn primitive<'d>(dialog: &'d DialogInstance, key: &str) -> Option<&'d PrimitiveValue> {
    dialog
        .properties
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .and_then(|(_, value)| value.as_primitive())
}

fn linked<'m>(model: &'m SemanticModel, dialog: &DialogInstance, key: &str) -> Option<&'m ScriptFunction> {
    dialog
        .properties
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .and_then(|(_, value)| value.as_function())
        .and_then(|id| model.functions.get(id))
}

fn dialog_npc(dialog: &DialogInstance) -> Option<String> {
    primitive(dialog, "npc").map(PrimitiveValue::render_raw)
}

pub fn dialog_view(model: &SemanticModel, dialog: &DialogInstance) -> DialogView {
    DialogView {
        name: dialog.name.clone(),
        parent_type: dialog.parent_type.clone(),
        npc: dialog_npc(dialog),
        nr: primitive(dialog, "nr").and_then(PrimitiveValue::as_number),
        description: primitive(dialog, "description").map(PrimitiveValue::render_raw),
        permanent: primitive(dialog, "permanent").and_then(PrimitiveValue::as_bool),
        properties: dialog
            .properties
            .iter()
            .map(|(key, value)| PropertyView {
                key: key.to_string(),
                value: render_property(model, value),
            })
            .collect(),
        condition: linked(model, dialog, "condition").map(FunctionView::of),
        information: linked(model, dialog, "information").map(FunctionView::of),
    }
}

pub fn extract_dialog(model: &SemanticModel, name: &str) -> Result<DialogView, DaedalusError> {
    let dialog = model.dialog(name).ok_or_else(|| {
        DaedalusError::new(
            "API_DIALOG_NOT_FOUND",
            format!(
                "Dialog \"{}\" not found. Available dialogs: {}",
                name,
                available(model.dialogs.keys())
            ),
        )
    })?;
    Ok(dialog_view(model, dialog))
}

/// An NPC instance with every dialog whose `npc` property names it. Dialogs
/// alone are enough when the instance lives in another file.
pub fn extract_npc(model: &SemanticModel, name: &str) -> Result<NpcView, DaedalusError> {
    let instance = model
        .npcs
        .iter()
        .find(|(npc, _)| npc.eq_ignore_ascii_case(name))
        .map(|(_, instance)| instance);
    let dialogs: Vec<DialogView> = model
        .dialogs
        .values()
        .filter(|dialog| {
            dialog_npc(dialog)
                .map(|npc| npc.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .map(|dialog| dialog_view(model, dialog))
        .collect();

    match instance {
        Some(instance) => Ok(NpcView {
            name: instance.name.clone(),
            parent_type: instance.parent_type.clone(),
            display_name: instance.display_name.clone(),
            source_text: Some(instance.source_text.clone()),
            dialogs,
        }),
        None if !dialogs.is_empty() => Ok(NpcView {
            name: name.to_string(),
            parent_type: String::new(),
            display_name: None,
            source_text: None,
            dialogs,
        }),
        None => Err(DaedalusError::new(
            "API_NPC_NOT_FOUND",
            format!(
                "NPC \"{}\" not found. Available NPCs: {}",
                name,
                available(model.npcs.keys())
            ),
        )),
    }
}

fn available<'a>(names: impl Iterator<Item = &'a String>) -> String {
    let names: Vec<&str> = names.map(String::as_str).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

pub fn dialog_summaries(model: &SemanticModel) -> Vec<DialogSummary> {
    model
        .dialogs
        .values()
        .map(|dialog| {
            let npc = dialog_npc(dialog);
            let lines: Vec<&Action> = dialog
                .actions
                .iter()
                .filter(|action| matches!(action, Action::DialogLine { .. }))
                .collect();
            let choices = dialog
                .actions
                .iter()
                .filter(|action| matches!(action, Action::Choice { .. }))
                .count();
            let preview = lines
                .iter()
                .take(PREVIEW_LINES)
                .filter_map(|action| match action {
                    Action::DialogLine { speaker, text, .. } => Some(DialogLinePreview {
                        speaker: speaker_label(speaker, npc.as_deref()),
                        text: text.trim().to_string(),
                    }),
                    _ => None,
                })
                .collect();
            DialogSummary {
                name: dialog.name.clone(),
                nr: primitive(dialog, "nr").and_then(PrimitiveValue::as_number),
                description: primitive(dialog, "description").map(PrimitiveValue::render_raw),
                permanent: primitive(dialog, "permanent").and_then(PrimitiveValue::as_bool),
                lines: lines.len(),
                choices,
                has_actions: dialog.actions.iter().filter(|action| !action.is_comment()).count()
                    > lines.len() + choices,
                preview,
                condition: linked(model, dialog, "condition").map(condition_summary),
                npc,
            }
        })
        .collect()
}

fn speaker_label(speaker: &str, npc: Option<&str>) -> String {
    match speaker.to_ascii_lowercase().as_str() {
        "self" => npc.unwrap_or(speaker).to_string(),
        "other" | "hero" => "Player".to_string(),
        _ => speaker.to_string(),
    }
}

fn condition_summary(function: &ScriptFunction) -> String {
    if function.raw {
        return "custom logic".to_string();
    }
    if function.conditions.is_empty() {
        return "always".to_string();
    }
    function
        .conditions
        .iter()
        .map(Condition::display)
        .collect::<Vec<_>>()
        .join(" && ")
}

pub fn npc_summaries(model: &SemanticModel) -> Vec<NpcSummary> {
    model
        .npcs
        .values()
        .map(|npc| NpcSummary {
            name: npc.name.clone(),
            parent_type: npc.parent_type.clone(),
            display_name: npc.display_name.clone(),
            dialog_count: model
                .dialogs
                .values()
                .filter(|dialog| {
                    dialog_npc(dialog)
                        .map(|name| name.eq_ignore_ascii_case(&npc.name))
                        .unwrap_or(false)
                })
                .count(),
        })
        .collect()
}

pub fn parse_summary(model: &SemanticModel) -> ParseSummary {
    let dialog_npcs: BTreeSet<String> = model.dialogs.values().filter_map(dialog_npc).collect();
    let related: BTreeSet<_> = model
        .dialogs
        .values()
        .flat_map(|dialog| dialog.properties.iter())
        .filter_map(|(_, value)| value.as_function())
        .collect();
    ParseSummary {
        npcs: model.npcs.len(),
        dialogs: model.dialogs.len(),
        dialog_npcs: dialog_npcs.into_iter().collect(),
        related_functions: related.len(),
    }
}
