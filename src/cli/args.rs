use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the templar binary.
#[derive(Parser, Debug)]
#[command(
    name = "templar",
    version,
    about = "Checks @template generics of a JSON project description"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check every site of a project file.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project file to check.
    pub file: PathBuf,

    /// Output format for diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Check sites one after another on the calling thread.
    #[arg(long = "no-parallel")]
    pub no_parallel: bool,

    /// Report at most this many diagnostics (0 reports all).
    #[arg(long = "max-diagnostics")]
    pub max_diagnostics: Option<usize>,

    /// Force colored output on or off.
    #[arg(long)]
    pub pretty: Option<bool>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
