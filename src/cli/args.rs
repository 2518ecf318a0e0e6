//! Top-level argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    block::BlockCommands, completions::CompletionsArgs, event::EventCommands,
    export::ExportArgs, import::ImportArgs, init::InitArgs, log::LogArgs,
    orchard::OrchardCommands, sector::SectorCommands, stats::StatsArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "o360",
    about = "Orchard360 - orchard tree inventory tracking",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pick per command: tsv for lists, yaml for single records
    Auto,
    /// Tab-separated values
    Tsv,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// CSV
    Csv,
    /// Bare entity ids, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` for the command at hand; explicit choices pass through
    ///
    /// Lists read best as tab-separated columns; a single record as a YAML
    /// document. `Csv` and `Id` are only ever explicit.
    pub fn resolve(self, is_list: bool) -> OutputFormat {
        match self {
            OutputFormat::Auto if is_list => OutputFormat::Tsv,
            OutputFormat::Auto => OutputFormat::Yaml,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new inventory project
    Init(InitArgs),

    /// Manage sectors
    #[command(subcommand)]
    Sector(SectorCommands),

    /// Manage orchards
    #[command(subcommand)]
    Orchard(OrchardCommands),

    /// Manage blocks
    #[command(subcommand)]
    Block(BlockCommands),

    /// Record and manage tree-change events
    #[command(subcommand)]
    Event(EventCommands),

    /// Per-block rollups of the event set
    Stats(StatsArgs),

    /// Export events to a denormalized CSV file
    Export(ExportArgs),

    /// Import events from a CSV file (current or legacy format)
    Import(ImportArgs),

    /// Show the audit log
    Log(LogArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
