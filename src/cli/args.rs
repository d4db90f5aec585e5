//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, fill::FillArgs, flatten::FlattenArgs,
    schema::SchemaCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "schemaform")]
#[command(author, version, about = "Schema-driven form engine")]
#[command(long_about = "Load a form schema and an optional prefill document, flatten it into \
path-addressed fields, validate them, and fill the form interactively.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect form schemas
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Print the flattened field values of a prefill document
    Flatten(FlattenArgs),

    /// Validate a prefill document, optionally after applying edits
    Validate(ValidateArgs),

    /// Fill in a form interactively
    Fill(FillArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Schema and prefill inputs shared by form commands
#[derive(clap::Args, Clone, Debug, Default)]
pub struct FormSourceArgs {
    /// Schema document (JSON or YAML); falls back to the configured schema
    #[arg(long, short = 's')]
    pub schema: Option<PathBuf>,

    /// Prefill document locator; falls back to the configured prefill
    #[arg(long, short = 'p')]
    pub prefill: Option<String>,

    /// Skip the structural pre-check of the schema document
    #[arg(long)]
    pub lenient: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for terminals, tsv for pipes)
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
}

impl OutputFormat {
    /// Parse a configured format name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    /// Resolve `Auto` against the configured default
    pub fn or_configured(self, configured: Option<&str>) -> Self {
        match self {
            OutputFormat::Auto => configured.and_then(Self::from_name).unwrap_or(OutputFormat::Auto),
            explicit => explicit,
        }
    }
}
