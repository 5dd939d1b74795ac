//! # Store Errors
//!
//! `InvalidId` and `NotFound` are distinct kinds for diagnostics, though the
//! HTTP surface reports them identically on mutation paths. Corruption is
//! terminal: a store that fails checksum verification refuses to open.

use std::io;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The supplied identifier does not parse as an issue id.
    #[error("invalid issue id '{0}'")]
    InvalidId(String),

    /// No record matches the identifier.
    #[error("no issue with id '{0}'")]
    NotFound(String),

    /// Disk I/O failure while writing or reading the log.
    #[error("storage {op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The log contains a record that fails verification.
    #[error("data corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },
}

impl StoreError {
    pub fn write_failed(source: io::Error) -> Self {
        Self::Io {
            op: "write",
            source,
        }
    }

    pub fn read_failed(source: io::Error) -> Self {
        Self::Io { op: "read", source }
    }

    pub fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = StoreError::InvalidId("nope".to_string());
        assert!(err.to_string().contains("nope"));

        let err = StoreError::corruption(42, "checksum mismatch");
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("checksum"));
    }
}
