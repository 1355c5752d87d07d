use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Literal value of a property, constant or comparison operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PrimitiveValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// Renders the value as source text, emitting strings verbatim.
    pub fn render_raw(&self) -> String {
        match self {
            Self::Bool(value) => render_bool(*value).to_string(),
            Self::Number(value) => render_number(*value),
            Self::String(value) => value.clone(),
        }
    }

    /// Renders the value as a literal: identifiers and already quoted text
    /// pass through, any other string is quoted.
    pub fn render_literal(&self) -> String {
        match self {
            Self::String(value) => {
                if is_identifier(value) || is_quoted(value) {
                    value.clone()
                } else {
                    quote(value)
                }
            }
            other => other.render_raw(),
        }
    }
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_raw())
    }
}

/// Stable handle of a function inside a model's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub usize);

/// Value of a dialog property: either a literal or a link to a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Function { function: FunctionId },
    Primitive(PrimitiveValue),
}

impl PropertyValue {
    pub fn function(id: FunctionId) -> Self {
        Self::Function { function: id }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Primitive(PrimitiveValue::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::Primitive(PrimitiveValue::Number(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::Primitive(PrimitiveValue::Bool(value))
    }

    pub fn as_function(&self) -> Option<FunctionId> {
        match self {
            Self::Function { function } => Some(*function),
            Self::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Primitive(value) => Some(value),
            Self::Function { .. } => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        self.as_primitive().and_then(PrimitiveValue::as_string)
    }
}

pub fn render_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub fn render_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn is_identifier(value: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"))
        .is_match(value)
}

pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

pub fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

/// Strips exactly one pair of outer double quotes, keeping inner content.
pub fn strip_outer_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn literal_rendering_follows_quoting_rules() {
        assert_eq!(PrimitiveValue::Bool(true).render_literal(), "TRUE");
        assert_eq!(PrimitiveValue::Number(3.0).render_literal(), "3");
        assert_eq!(PrimitiveValue::Number(0.5).render_literal(), "0.5");
        assert_eq!(
            PrimitiveValue::String("NPC_A".to_string()).render_literal(),
            "NPC_A"
        );
        assert_eq!(
            PrimitiveValue::String("Hello there".to_string()).render_literal(),
            "\"Hello there\""
        );
        assert_eq!(
            PrimitiveValue::String("\"kept\"".to_string()).render_literal(),
            "\"kept\""
        );
    }

    #[test]
    fn raw_rendering_never_quotes() {
        assert_eq!(
            PrimitiveValue::String("a + b".to_string()).render_raw(),
            "a + b"
        );
    }

    #[test]
    fn strip_outer_quotes_keeps_inner_quotes() {
        assert_eq!(strip_outer_quotes("\"say \\\"hi\\\"\""), "say \\\"hi\\\"");
        assert_eq!(strip_outer_quotes("plain"), "plain");
    }

    #[test]
    fn property_values_serialize_function_links_by_id() {
        let link = PropertyValue::function(FunctionId(3));
        let json = serde_json::to_string(&link).expect("link should serialize");
        assert_eq!(json, "{\"function\":3}");
        let back: PropertyValue = serde_json::from_str(&json).expect("link should parse");
        assert_eq!(back, link);

        let number: PropertyValue = serde_json::from_str("7").expect("number should parse");
        assert_eq!(number, PropertyValue::number(7.0));
        let text: PropertyValue = serde_json::from_str("\"x\"").expect("string should parse");
        assert_eq!(text.as_string(), Some("x"));
    }
}
