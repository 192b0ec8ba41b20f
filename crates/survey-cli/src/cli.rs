//! CLI argument definitions for survey-studio.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "survey-studio",
    version,
    about = "Restructure questionnaire templates and export them as a survey",
    long_about = "Restructure parsed questionnaire templates before exporting them to a \
                  survey-authoring tool.\n\n\
                  Items with identical response levels are merged into matrix questions, \
                  repeated templates are numbered as runs, and an edit script can reorder, \
                  disable or override items."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the matrix layout of every group.
    Preview(PreviewArgs),

    /// Write the export payload for the edited survey.
    Export(ExportArgs),

    /// List question types and the override fields each one accepts.
    Types,
}

/// Arguments shared by commands that open a workspace.
#[derive(Args)]
pub struct SourceArgs {
    /// JSON load response produced by the template loader.
    #[arg(value_name = "LOAD_JSON")]
    pub load_response: PathBuf,

    /// Template id to load; repeat to select several or to add runs.
    #[arg(long = "template", value_name = "ID")]
    pub templates: Vec<String>,

    /// TOML file with survey, export and tool settings.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON edit script replayed after loading.
    #[arg(long = "edits", value_name = "FILE")]
    pub edits: Option<PathBuf>,

    /// Matrix grouping mode (overrides the config file).
    #[arg(long = "matrix", value_enum)]
    pub matrix: Option<MatrixArg>,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Language used to resolve item text.
    #[arg(long = "lang", value_name = "LANG")]
    pub lang: Option<String>,

    /// Also list disabled items.
    #[arg(long = "show-disabled")]
    pub show_disabled: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file for the payload (default: <TITLE>.json).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Survey title (overrides the config file).
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Ask the exporter to also store the templates in the shared library.
    #[arg(long = "save-to-library")]
    pub save_to_library: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MatrixArg {
    Off,
    Consecutive,
    Global,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
