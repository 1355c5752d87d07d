use std::fs;
use std::path::Path;

use dd_api::GeneratorOptions;
use dd_core::DaedalusError;

use crate::{map_cli_output_write, GeneratorArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Json,
    Daedalus,
}

impl OutputFormat {
    pub(crate) fn parse(value: &str) -> Result<Self, DaedalusError> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "daedalus" | "d" => Ok(Self::Daedalus),
            _ => Err(DaedalusError::new(
                "CLI_FORMAT_UNSUPPORTED",
                format!("Unsupported format: {} (expected json or daedalus)", value),
            )),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Daedalus => "daedalus",
        }
    }
}

pub(crate) fn generator_options(args: &GeneratorArgs) -> GeneratorOptions {
    let mut options = GeneratorOptions::default();
    options.include_comments = !args.no_comments;
    if let Some(size) = args.indent_size {
        options.indent_size = size;
        options.indent_char = if args.indent_tabs { '\t' } else { ' ' };
    }
    options.max_line_length = args.max_line_length;
    if args.normalize {
        options.preserve_source_style = false;
    }
    options
}

pub(crate) fn write_output(path: &str, content: &str) -> Result<(), DaedalusError> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(map_cli_output_write)?;
    }
    fs::write(path, content).map_err(map_cli_output_write)
}

/// Writes to `target` and reports it, or prints the content to stdout.
pub(crate) fn emit_content(
    target: Option<&str>,
    content: &str,
    report: impl FnOnce(&str) -> String,
) -> Result<(), DaedalusError> {
    match target {
        Some(path) => {
            write_output(path, content)?;
            println!("{}", report(path));
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
