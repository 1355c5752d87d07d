use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "daedalus-dialog")]
#[command(about = "Inspect, convert and regenerate Daedalus dialog scripts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Parse a script and summarize its NPCs and dialogs.
    Parse(ParseArgs),
    /// List the dialogs of a script.
    List(ListArgs),
    /// Convert a script to its JSON model, or a JSON model back to source.
    Convert(ConvertArgs),
    /// Extract one dialog with its linked functions.
    Extract(ExtractArgs),
    /// List the NPC instances of a script.
    ListNpcs(FileArgs),
    /// Extract one NPC with every dialog that belongs to it.
    ExtractNpc(ExtractNpcArgs),
    /// Check a script, or every `.d` file below a directory.
    Validate(ValidateArgs),
    /// Show the convert based editing workflow.
    Edit(FileArgs),
}

#[derive(Debug, Args)]
pub(crate) struct FileArgs {
    pub(crate) file: String,
}

#[derive(Debug, Args)]
pub(crate) struct ParseArgs {
    pub(crate) file: String,
    /// Also print the full semantic model as JSON.
    #[arg(long = "pretty")]
    pub(crate) pretty: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    pub(crate) file: String,
    /// Print every classified action of each dialog.
    #[arg(long = "flow")]
    pub(crate) flow: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ConvertArgs {
    pub(crate) input: String,
    pub(crate) output_path: Option<String>,
    #[arg(short = 'o', long = "output")]
    pub(crate) output: Option<String>,
    /// `json` or `daedalus`. Defaults to the opposite of the input.
    #[arg(long = "format")]
    pub(crate) format: Option<String>,
    #[arg(long = "pretty")]
    pub(crate) pretty: bool,
    #[command(flatten)]
    pub(crate) generator: GeneratorArgs,
}

impl ConvertArgs {
    pub(crate) fn output_target(&self) -> Option<&str> {
        self.output.as_deref().or(self.output_path.as_deref())
    }
}

#[derive(Debug, Args)]
pub(crate) struct ExtractArgs {
    pub(crate) file: String,
    pub(crate) dialog: String,
    #[arg(short = 'o', long = "output")]
    pub(crate) output: Option<String>,
    #[arg(long = "format")]
    pub(crate) format: Option<String>,
    #[arg(long = "pretty")]
    pub(crate) pretty: bool,
    #[command(flatten)]
    pub(crate) generator: GeneratorArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ExtractNpcArgs {
    pub(crate) file: String,
    pub(crate) npc: String,
    #[arg(short = 'o', long = "output")]
    pub(crate) output: Option<String>,
    #[arg(long = "pretty")]
    pub(crate) pretty: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    pub(crate) path: String,
    /// Regenerate each file and compare the re-parsed model.
    #[arg(long = "round-trip")]
    pub(crate) round_trip: bool,
}

#[derive(Debug, Default, Args)]
pub(crate) struct GeneratorArgs {
    /// Drop comments and dialog line text comments from the output.
    #[arg(long = "no-comments")]
    pub(crate) no_comments: bool,
    #[arg(long = "indent-size")]
    pub(crate) indent_size: Option<usize>,
    /// Indent with tabs when `--indent-size` is given.
    #[arg(long = "indent-tabs")]
    pub(crate) indent_tabs: bool,
    #[arg(long = "max-line-length")]
    pub(crate) max_line_length: Option<usize>,
    /// Ignore captured keyword casing and spacing.
    #[arg(long = "normalize")]
    pub(crate) normalize: bool,
}
