use clap::{Args, Parser, Subcommand};
use clean_files::policy::Mode;
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "clean-files")]
#[command(about = "Find and interactively fix empty, temporary, duplicate, same-named, mis-permissioned and badly named files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories and resolve findings interactively
    Clean(CleanArgs),
    /// Print the effective configuration as TOML
    PrintConfig {
        /// Configuration file to use instead of the default locations
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Which policy to run; `all` runs every policy in a fixed order
    #[arg(short, long, value_enum, default_value_t = Mode::All)]
    pub mode: Mode,

    /// Configuration file to use instead of the default locations
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Describe every finding but change nothing
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Apply every finding without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Write a CSV row per finding to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directories to scan
    #[arg(required = true)]
    pub directories: Vec<PathBuf>,
}
