//! Document store subsystem
//!
//! Holds the canonical persistent state of all issues, partitioned by
//! project.
//!
//! # Design Principles
//!
//! - Append-only log, no in-place updates
//! - Checksum-verified on every read
//! - Latest record wins for the same issue id; tombstones delete
//! - Full in-memory rebuild on open; serving never starts from a
//!   partially-replayed log
//! - Mutations are acknowledged only after fsync

mod errors;
mod log;
mod record;
mod store;

pub use errors::{StoreError, StoreResult};
pub use log::{LogReader, LogWriter};
pub use record::LogRecord;
pub use store::IssueStore;
