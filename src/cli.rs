//! Command-line argument parsing
//!
//! Supports:
//! - Replaying a pointer scenario against a table document
//! - Printing the effective resize configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interactive table column resizing, driven headlessly
#[derive(Parser, Debug)]
#[command(name = "tablegrip", version, about = "Table column-resizing engine")]
pub struct CliArgs {
    /// Config file to use instead of the user config
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a YAML scenario and print the resulting document
    Replay {
        /// Scenario file
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}
