//! Entry points for tools working with Daedalus dialog scripts.

use dd_core::{DaedalusError, SemanticModel};
use tracing::debug;

mod round_trip;
mod validation;
mod views;

pub use dd_codegen::{generate_dialog, generate_function, GeneratorOptions};
pub use round_trip::{round_trip, summarize_model, FunctionSummary, ModelSummary, RoundTripReport};
pub use validation::{validate_model, ValidationWarning};
pub use views::{
    dialog_summaries, dialog_view, extract_dialog, extract_npc, npc_summaries, parse_summary,
    render_property, DialogLinePreview, DialogSummary, DialogView, FunctionView, NpcSummary,
    NpcView, ParseSummary, PropertyView,
};

pub fn parse_semantic_model(source: &str) -> SemanticModel {
    dd_semantic::parse_semantic_model(source)
}

pub fn generate_source(model: &SemanticModel, options: &GeneratorOptions) -> String {
    dd_codegen::generate(model, options)
}

pub fn model_to_json(model: &SemanticModel, pretty: bool) -> Result<String, DaedalusError> {
    to_json(model, pretty)
}

pub fn model_from_json(text: &str) -> Result<SemanticModel, DaedalusError> {
    let model: SemanticModel = serde_json::from_str(text).map_err(|error| {
        DaedalusError::new(
            "MODEL_JSON_INVALID",
            format!("Semantic model JSON is invalid: {}", error),
        )
    })?;
    debug!(
        dialogs = model.dialogs.len(),
        functions = model.functions.len(),
        "model loaded from json"
    );
    Ok(model)
}

/// Serializes any view or model to JSON.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, DaedalusError> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|error| {
        DaedalusError::new(
            "MODEL_JSON_ENCODE",
            format!("Failed to encode JSON: {}", error),
        )
    })
}

#[cfg(test)]
mod tests;
