use std::fs;
use std::path::{Path, PathBuf};

use dd_api::parse_semantic_model;
use dd_core::{DaedalusError, SemanticModel, SyntaxErrorKind};
use tracing::debug;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan};

pub(crate) const SCRIPT_EXTENSION: &str = "d";

#[derive(Debug)]
pub(crate) struct LoadedScript {
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

impl LoadedScript {
    pub(crate) fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

pub(crate) fn resolve_source_path(path: &str) -> Result<PathBuf, DaedalusError> {
    let path = PathBuf::from(path);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(DaedalusError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("File not found: {}", absolute.display()),
        ));
    }
    Ok(absolute)
}

pub(crate) fn read_script(path: &str) -> Result<LoadedScript, DaedalusError> {
    let path = resolve_source_path(path)?;
    let source = read_source(&path)?;
    Ok(LoadedScript { path, source })
}

pub(crate) fn read_source(path: &Path) -> Result<String, DaedalusError> {
    let bytes = fs::read(path).map_err(map_cli_source_read)?;
    Ok(decode_source(bytes))
}

/// Scripts are usually Windows-1252; anything that is not valid UTF-8 is
/// read byte for byte as Latin-1.
pub(crate) fn decode_source(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => {
            debug!("source is not utf-8, decoding as latin-1");
            error.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Reads and parses a script, failing when it has syntax errors.
pub(crate) fn load_model(path: &str) -> Result<(LoadedScript, SemanticModel), DaedalusError> {
    let script = read_script(path)?;
    let model = parse_semantic_model(&script.source);
    if model.has_errors {
        return Err(parse_failure(path, &model));
    }
    Ok((script, model))
}

pub(crate) fn parse_failure(label: &str, model: &SemanticModel) -> DaedalusError {
    let details = model
        .errors
        .iter()
        .map(|error| format!("{}: {}", error_kind_label(error.kind), error.message))
        .collect::<Vec<_>>()
        .join("; ");
    let message = format!("Parse errors in {}: {}", label, details);
    match model.errors.first() {
        Some(first) => DaedalusError::at_diagnostic("CLI_PARSE_FAILED", message, first),
        None => DaedalusError::new("CLI_PARSE_FAILED", message),
    }
}

pub(crate) fn error_kind_label(kind: SyntaxErrorKind) -> &'static str {
    match kind {
        SyntaxErrorKind::SyntaxError => "syntax_error",
        SyntaxErrorKind::MissingToken => "missing_token",
    }
}

/// A single file, or every `.d` file below a directory in path order.
pub(crate) fn collect_script_files(root: &Path) -> Result<Vec<PathBuf>, DaedalusError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_script = entry
            .path()
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.eq_ignore_ascii_case(SCRIPT_EXTENSION))
            .unwrap_or(false);
        if is_script {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(DaedalusError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .{} files found in {}", SCRIPT_EXTENSION, root.display()),
        ));
    }
    Ok(files)
}
