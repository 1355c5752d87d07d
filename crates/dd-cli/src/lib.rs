use std::ffi::OsString;

use clap::Parser;
use dd_core::DaedalusError;

mod cli_args;
mod convert;
mod error_map;
mod inspect;
mod logging;
mod output;
mod source_loader;
mod validate;

pub(crate) use cli_args::{
    Cli, Command, ConvertArgs, ExtractArgs, ExtractNpcArgs, FileArgs, GeneratorArgs, ListArgs,
    ParseArgs, ValidateArgs,
};
pub(crate) use error_map::{
    emit_error, map_cli_output_write, map_cli_source_path, map_cli_source_read,
    map_cli_source_scan,
};
pub(crate) use output::{emit_content, generator_options, OutputFormat};
#[cfg(test)]
pub(crate) use source_loader::decode_source;
pub(crate) use source_loader::{
    collect_script_files, error_kind_label, load_model, parse_failure, read_source,
    resolve_source_path,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    logging::init();
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, DaedalusError> {
    match cli.command {
        Command::Parse(args) => inspect::run_parse(args),
        Command::List(args) => inspect::run_list(args),
        Command::Convert(args) => convert::run_convert(args),
        Command::Extract(args) => inspect::run_extract(args),
        Command::ListNpcs(args) => inspect::run_list_npcs(args),
        Command::ExtractNpc(args) => inspect::run_extract_npc(args),
        Command::Validate(args) => validate::run_validate(args),
        Command::Edit(args) => inspect::run_edit(args),
    }
}
