//! Command-line argument model

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::customer::CustomerCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::repair::RepairCommands;
use crate::cli::commands::settings::SettingsCommands;
use crate::cli::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "taller")]
#[command(author, version, about = "Repair-shop work orders as plain-text files")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Shop directory (default: search up from the current directory)
    #[arg(long, global = true, env = "TALLER_SHOP")]
    pub shop: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// TSV for lists, human-readable for single records
    #[default]
    Auto,
    /// Tab-separated values
    Tsv,
    /// Boxed table
    Table,
    Json,
    Yaml,
    Csv,
    /// Full ids only, one per line
    Id,
    /// Short aliases only (REP@1), one per line
    ShortId,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new shop in the current (or given) directory
    Init(InitArgs),

    /// Repair work orders
    #[command(subcommand, visible_alias = "rep")]
    Repair(RepairCommands),

    /// Customer records
    #[command(subcommand, visible_alias = "cust")]
    Customer(CustomerCommands),

    /// Shop settings (status styles, device catalog, common problems)
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Validate shop documents against their schemas
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
