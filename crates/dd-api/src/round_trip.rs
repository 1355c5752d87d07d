use std::collections::BTreeMap;

use dd_codegen::{generate, GeneratorOptions};
use dd_core::SemanticModel;
use serde::Serialize;
use tracing::debug;

use crate::views::render_property;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSummary {
    pub raw: bool,
    pub conditions: Vec<String>,
    /// Rendered without comments, so dialog text carried by comments and
    /// comment-only actions do not count.
    pub actions: Vec<String>,
}

/// Comparable shape of a model: rendered properties per dialog and rendered
/// bodies per function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub dialogs: BTreeMap<String, Vec<(String, String)>>,
    pub functions: BTreeMap<String, FunctionSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripReport {
    pub generated: String,
    pub regenerated_has_errors: bool,
    pub differences: Vec<String>,
}

impl RoundTripReport {
    pub fn is_clean(&self) -> bool {
        !self.regenerated_has_errors && self.differences.is_empty()
    }
}

pub fn summarize_model(model: &SemanticModel) -> ModelSummary {
    let dialogs = model
        .dialogs
        .iter()
        .map(|(name, dialog)| {
            let properties = dialog
                .properties
                .iter()
                .map(|(key, value)| (key.to_string(), render_property(model, value)))
                .collect();
            (name.clone(), properties)
        })
        .collect();
    let functions = model
        .functions
        .iter()
        .map(|(_, function)| {
            (
                function.name.clone(),
                FunctionSummary {
                    raw: function.raw,
                    conditions: function.conditions.iter().map(|c| c.render()).collect(),
                    actions: function
                        .actions
                        .iter()
                        .filter(|a| !a.is_comment())
                        .map(|a| a.render(false))
                        .collect(),
                },
            )
        })
        .collect();
    ModelSummary { dialogs, functions }
}

/// Generates source from `model`, parses it again and reports every
/// structural difference between the two models.
pub fn round_trip(model: &SemanticModel, options: &GeneratorOptions) -> RoundTripReport {
    let generated = generate(model, options);
    let regenerated = dd_semantic::parse_semantic_model(&generated);
    let differences = if regenerated.has_errors {
        Vec::new()
    } else {
        diff_summaries(&summarize_model(model), &summarize_model(&regenerated))
    };
    debug!(
        differences = differences.len(),
        has_errors = regenerated.has_errors,
        "round trip checked"
    );
    RoundTripReport {
        generated,
        regenerated_has_errors: regenerated.has_errors,
        differences,
    }
}

fn diff_summaries(before: &ModelSummary, after: &ModelSummary) -> Vec<String> {
    let mut differences = Vec::new();
    diff_maps("dialog", &before.dialogs, &after.dialogs, &mut differences);
    diff_maps("function", &before.functions, &after.functions, &mut differences);
    differences
}

fn diff_maps<T: PartialEq + std::fmt::Debug>(
    label: &str,
    before: &BTreeMap<String, T>,
    after: &BTreeMap<String, T>,
    out: &mut Vec<String>,
) {
    for (name, value) in before {
        match after.get(name) {
            None => out.push(format!("{} '{}' lost", label, name)),
            Some(other) if other != value => out.push(format!(
                "{} '{}' changed: {:?} -> {:?}",
                label, name, value, other
            )),
            Some(_) => {}
        }
    }
    for name in after.keys().filter(|name| !before.contains_key(*name)) {
        out.push(format!("{} '{}' appeared", label, name));
    }
}
