//! CLI argument definitions using clap
//!
//! Commands:
//! - issuedb init --config <path>
//! - issuedb start --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// issuedb - a project-scoped issue tracker with a durable document store
#[derive(Parser, Debug)]
#[command(name = "issuedb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new issuedb data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./issuedb.json")]
        config: PathBuf,
    },

    /// Start the issue API server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./issuedb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
