//! Observability: structured event logging.

mod logger;

pub use logger::{Logger, Severity};
