//! # Issue Log
//!
//! Append-only persistence for the store. The writer appends encoded records
//! and fsyncs after every write; a mutation is not acknowledged until the
//! record is durable. The reader scans the log sequentially, verifying each
//! record's checksum, and is used once per process to rebuild the in-memory
//! state on open.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::record::{LogRecord, MIN_RECORD_LEN};

/// Name of the log file inside `<data_dir>/data/`.
const LOG_FILE: &str = "issues.dat";

/// Appends records to the issue log with fsync enforcement.
pub struct LogWriter {
    path: PathBuf,
    file: File,
}

impl LogWriter {
    /// Opens or creates `<data_dir>/data/issues.dat`, creating parent
    /// directories as needed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let data_subdir = data_dir.join("data");
        fs::create_dir_all(&data_subdir).map_err(StoreError::write_failed)?;

        let path = data_subdir.join(LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StoreError::write_failed)?;

        Ok(Self { path, file })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and fsyncs before returning.
    pub fn append(&mut self, record: &LogRecord) -> StoreResult<()> {
        let encoded = record.encode();
        self.file
            .write_all(&encoded)
            .map_err(StoreError::write_failed)?;
        self.file.sync_all().map_err(StoreError::write_failed)?;
        Ok(())
    }
}

/// Sequential, checksum-verified scan over the issue log.
pub struct LogReader {
    reader: BufReader<File>,
    offset: u64,
    len: u64,
}

impl LogReader {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(StoreError::read_failed)?;
        let len = file
            .metadata()
            .map_err(StoreError::read_failed)?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            offset: 0,
            len,
        })
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of log. Any malformed or checksum-failing
    /// record is a corruption error; replay aborts rather than skipping.
    pub fn read_next(&mut self) -> StoreResult<Option<LogRecord>> {
        if self.offset >= self.len {
            return Ok(None);
        }

        let remaining = self.len - self.offset;
        if remaining < MIN_RECORD_LEN as u64 {
            return Err(StoreError::corruption(
                self.offset,
                format!("truncated log: {} trailing bytes", remaining),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader
            .read_exact(&mut len_buf)
            .map_err(StoreError::read_failed)?;
        let record_len = u32::from_le_bytes(len_buf) as u64;

        if record_len < MIN_RECORD_LEN as u64 || record_len > remaining {
            return Err(StoreError::corruption(
                self.offset,
                format!("invalid record length {}", record_len),
            ));
        }

        let mut buf = vec![0u8; record_len as usize];
        buf[..4].copy_from_slice(&len_buf);
        self.reader
            .read_exact(&mut buf[4..])
            .map_err(StoreError::read_failed)?;

        let (record, consumed) = LogRecord::decode(&buf, self.offset)?;
        self.offset += consumed as u64;
        Ok(Some(record))
    }
}
