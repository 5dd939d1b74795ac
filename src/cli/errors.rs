//! CLI error types. All of these are fatal: the process prints the error
//! and exits non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("data directory already initialized")]
    AlreadyInitialized,

    #[error("data directory not initialized; run 'issuedb init' first")]
    NotInitialized,

    #[error("boot failed: {0}")]
    Boot(String),
}
