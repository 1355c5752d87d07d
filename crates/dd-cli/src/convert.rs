use std::path::Path;

use dd_api::{generate_source, model_from_json, model_to_json, parse_semantic_model};
use dd_core::{DaedalusError, SemanticModel};
use tracing::debug;

use crate::{
    emit_content, generator_options, parse_failure, read_source, resolve_source_path,
    ConvertArgs, OutputFormat,
};

pub(crate) fn run_convert(args: ConvertArgs) -> Result<i32, DaedalusError> {
    let path = resolve_source_path(&args.input)?;
    let source = read_source(&path)?;
    let json_input = is_json_input(&path, &source);
    let model = load_input(&args.input, &source, json_input)?;

    let format = match args.format.as_deref() {
        Some(value) => OutputFormat::parse(value)?,
        None if json_input => OutputFormat::Daedalus,
        None => OutputFormat::Json,
    };
    debug!(
        input = %args.input,
        format = format.name(),
        json_input,
        "converting"
    );

    let content = match format {
        OutputFormat::Json => model_to_json(&model, args.pretty)?,
        OutputFormat::Daedalus => generate_source(&model, &generator_options(&args.generator)),
    };
    emit_content(args.output_target(), &content, |target| {
        format!("Converted {} to {} ({})", args.input, target, format.name())
    })?;
    Ok(0)
}

/// A `.json` extension or a leading `{` marks a serialized model.
pub(crate) fn is_json_input(path: &Path, source: &str) -> bool {
    let json_extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    json_extension || source.trim_start().starts_with('{')
}

fn load_input(label: &str, source: &str, json_input: bool) -> Result<SemanticModel, DaedalusError> {
    if json_input {
        return model_from_json(source);
    }
    let model = parse_semantic_model(source);
    if model.has_errors {
        return Err(parse_failure(label, &model));
    }
    Ok(model)
}

#[cfg(test)]
mod convert_tests {
    use super::*;

    #[test]
    fn json_input_is_detected_by_extension_or_content() {
        assert!(is_json_input(Path::new("model.json"), "instance X (C_INFO) {};"));
        assert!(is_json_input(Path::new("model.txt"), "  \n{\"dialogs\": {}}"));
        assert!(!is_json_input(Path::new("DIA_Hagen.d"), "instance X (C_INFO) {};"));
    }

    #[test]
    fn source_with_syntax_errors_is_rejected() {
        let error = load_input("broken.d", "func void A( { ", false)
            .expect_err("broken source should fail");
        assert_eq!(error.code, "CLI_PARSE_FAILED");
        assert!(error.message.contains("broken.d"));
    }
}
