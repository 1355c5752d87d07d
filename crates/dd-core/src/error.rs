use thiserror::Error;

use crate::model::SyntaxDiagnostic;
use crate::types::{SourceLocation, SourceSpan};

/// Pipeline stage named by the prefix of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Editing or (de)serializing a semantic model.
    Model,
    /// Building a model from a syntax tree.
    Semantic,
    /// Looking up dialogs and NPCs for views.
    Api,
    /// Reading scripts and writing results from the command line.
    Cli,
}

/// Failure raised while reading, modelling or regenerating a dialog script.
///
/// `code` is a stable `STAGE_REASON` identifier such as
/// `MODEL_FUNCTION_NOT_FOUND`. `span` points into the script when the
/// failure came from its text.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct DaedalusError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl DaedalusError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    /// Error anchored at the one-based position of a syntax diagnostic.
    pub fn at_diagnostic(
        code: impl Into<String>,
        message: impl Into<String>,
        diagnostic: &SyntaxDiagnostic,
    ) -> Self {
        let location = SourceLocation {
            line: diagnostic.position.row,
            column: diagnostic.position.column,
        };
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(SourceSpan::at(location)),
        }
    }

    pub fn stage(&self) -> Option<ErrorStage> {
        match self.code.split('_').next()? {
            "MODEL" => Some(ErrorStage::Model),
            "SEMANTIC" => Some(ErrorStage::Semantic),
            "API" => Some(ErrorStage::Api),
            "CLI" => Some(ErrorStage::Cli),
            _ => None,
        }
    }

    /// `line:column` of the span start.
    pub fn location(&self) -> Option<String> {
        self.span
            .as_ref()
            .map(|span| format!("{}:{}", span.start.line, span.start.column))
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::model::{DiagnosticPosition, SyntaxErrorKind};

    #[test]
    fn stages_follow_code_prefixes() {
        assert_eq!(
            DaedalusError::new("MODEL_FUNCTION_NOT_FOUND", "missing").stage(),
            Some(ErrorStage::Model)
        );
        assert_eq!(
            DaedalusError::new("SEMANTIC_PASS_ORDER", "early").stage(),
            Some(ErrorStage::Semantic)
        );
        assert_eq!(DaedalusError::new("CLI_SOURCE_EMPTY", "none").stage(), Some(ErrorStage::Cli));
        assert_eq!(DaedalusError::new("ERR", "other").stage(), None);
    }

    #[test]
    fn diagnostics_anchor_the_span() {
        let diagnostic = SyntaxDiagnostic {
            kind: SyntaxErrorKind::MissingToken,
            message: "Missing ';'".to_string(),
            position: DiagnosticPosition { row: 3, column: 7 },
            text: String::new(),
        };
        let error = DaedalusError::at_diagnostic("CLI_PARSE_FAILED", "broken", &diagnostic);
        assert_eq!(error.location().as_deref(), Some("3:7"));
        assert_eq!(error.to_string(), "CLI_PARSE_FAILED: broken");
        assert_eq!(DaedalusError::new("API_NPC_NOT_FOUND", "x").location(), None);
    }
}
