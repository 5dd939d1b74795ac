//! CLI command implementations
//!
//! `init` prepares a data directory and refuses to run twice; `start` boots
//! the store (full log replay) and serves HTTP. Neither command starts
//! serving from a partially-prepared state.

use std::fs;
use std::path::Path;

use serde_json::json;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::config::Config;
use crate::server::HttpServer;
use crate::store::IssueStore;

/// Main CLI entry point. The only function `main.rs` calls.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch a parsed command.
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
    }
}

/// Initialize a new data directory.
///
/// Creates the layout only; no server is started and no records are
/// written.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::AlreadyInitialized);
    }

    fs::create_dir_all(data_dir.join("data"))?;

    println!("{}", json!({"initialized": true}));
    Ok(())
}

/// Boot the store and serve the issue API.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;

    if !is_initialized(config.data_path()) {
        return Err(CliError::NotInitialized);
    }

    // Replay must complete before the first request is accepted.
    let store = IssueStore::open(config.data_path())
        .map_err(|e| CliError::Boot(format!("store open failed: {}", e)))?;

    let server = HttpServer::new(config, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Boot(format!("failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::Boot(format!("http server failed: {}", e)))
    })
}

/// Whether a data directory has been initialized.
fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join("data").exists()
}
