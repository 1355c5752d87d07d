use dd_core::{DialogInstance, PropertyValue, SemanticModel};
use serde::Serialize;

/// Non-fatal structural problem of a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub dialog: String,
    pub code: String,
    pub message: String,
}

pub fn validate_model(model: &SemanticModel) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for dialog in model.dialogs.values() {
        if property(dialog, "npc").is_none() {
            warnings.push(warning(
                dialog,
                "DIALOG_MISSING_NPC",
                format!("Dialog '{}' missing required 'npc' property", dialog.name),
            ));
        }
        for key in ["condition", "information"] {
            match property(dialog, key) {
                None => warnings.push(warning(
                    dialog,
                    &format!("DIALOG_MISSING_{}", key.to_uppercase()),
                    format!("Dialog '{}' missing '{}' function", dialog.name, key),
                )),
                Some(PropertyValue::Function { .. }) => {}
                Some(value) => warnings.push(warning(
                    dialog,
                    &format!("DIALOG_UNRESOLVED_{}", key.to_uppercase()),
                    format!(
                        "Dialog '{}' {} '{}' does not name a known function",
                        dialog.name,
                        key,
                        value.as_string().unwrap_or_default()
                    ),
                )),
            }
        }
    }
    warnings
}

fn property<'d>(dialog: &'d DialogInstance, key: &str) -> Option<&'d PropertyValue> {
    dialog
        .properties
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

fn warning(dialog: &DialogInstance, code: &str, message: String) -> ValidationWarning {
    ValidationWarning {
        dialog: dialog.name.clone(),
        code: code.to_string(),
        message,
    }
}
