use std::path::Path;

use dd_api::{parse_semantic_model, round_trip, validate_model, GeneratorOptions};
use dd_core::DaedalusError;

use crate::{
    collect_script_files, error_kind_label, read_source, resolve_source_path, ValidateArgs,
};

pub(crate) fn run_validate(args: ValidateArgs) -> Result<i32, DaedalusError> {
    let root = resolve_source_path(&args.path)?;
    let files = collect_script_files(&root)?;
    let options = GeneratorOptions::default();

    let mut failed = 0usize;
    for file in &files {
        if !validate_file(file, args.round_trip, &options)? {
            failed += 1;
        }
    }

    if files.len() > 1 {
        println!();
        println!("Validated {} file(s), {} failed", files.len(), failed);
    }
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Prints the findings for one file; `false` when the file fails.
fn validate_file(
    path: &Path,
    check_round_trip: bool,
    options: &GeneratorOptions,
) -> Result<bool, DaedalusError> {
    println!("Validating dialog file: {}", path.display());
    let source = read_source(path)?;
    let model = parse_semantic_model(&source);

    if model.has_errors {
        println!("✗ File has syntax errors:");
        for error in &model.errors {
            println!("  {}: {}", error_kind_label(error.kind), error.message);
        }
        return Ok(false);
    }
    println!("✓ File is valid");

    let warnings = validate_model(&model);
    if warnings.is_empty() {
        println!("✓ Dialog structure is valid");
    } else {
        println!("⚠ Dialog structure warnings:");
        for warning in &warnings {
            println!("  - {}", warning.message);
        }
    }

    if !check_round_trip {
        return Ok(true);
    }
    let report = round_trip(&model, options);
    if report.is_clean() {
        println!("✓ Round trip preserves the model");
        return Ok(true);
    }
    println!("✗ Round trip changed the model:");
    if report.regenerated_has_errors {
        println!("  - regenerated source has syntax errors");
    }
    for difference in &report.differences {
        println!("  - {}", difference);
    }
    Ok(false)
}
