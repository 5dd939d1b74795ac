//! # Log Record Format
//!
//! Each store mutation appends one record to the issue log:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes this field and the checksum)
//! +------------------+
//! | Project          | (length-prefixed UTF-8)
//! +------------------+
//! | Issue ID         | (16 raw bytes)
//! +------------------+
//! | Tombstone Flag   | (u8: 0 = live, 1 = deleted)
//! +------------------+
//! | Issue Body       | (length-prefixed JSON, empty for tombstones)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over every preceding byte)
//! +------------------+
//! ```
//!
//! Later records for the same issue id supersede earlier ones; a tombstone
//! removes the issue. Every decode verifies the checksum.

use crc32fast::Hasher;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::issue::Issue;

/// Smallest possible encoded record: length + empty project + id + flag +
/// empty body + checksum.
pub const MIN_RECORD_LEN: usize = 4 + 4 + 16 + 1 + 4 + 4;

/// One entry in the issue log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Partition the issue belongs to.
    pub project: String,
    /// Issue identifier.
    pub id: Uuid,
    /// True for deletions.
    pub is_tombstone: bool,
    /// Serialized issue, empty for tombstones.
    pub body: Vec<u8>,
}

impl LogRecord {
    /// Full-document record for a created or updated issue.
    pub fn upsert(project: &str, issue: &Issue) -> StoreResult<Self> {
        let body = serde_json::to_vec(issue)
            .map_err(|e| StoreError::write_failed(std::io::Error::other(e)))?;
        Ok(Self {
            project: project.to_string(),
            id: issue.id,
            is_tombstone: false,
            body,
        })
    }

    /// Deletion marker for an issue.
    pub fn tombstone(project: &str, id: Uuid) -> Self {
        Self {
            project: project.to_string(),
            id,
            is_tombstone: true,
            body: Vec::new(),
        }
    }

    /// Parses the body back into an issue.
    pub fn issue(&self) -> Result<Issue, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Serializes the record, checksum included.
    pub fn encode(&self) -> Vec<u8> {
        let record_len =
            (4 + 4 + self.project.len() + 16 + 1 + 4 + self.body.len() + 4) as u32;

        let mut buf = Vec::with_capacity(record_len as usize);
        buf.extend_from_slice(&record_len.to_le_bytes());
        buf.extend_from_slice(&(self.project.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.project.as_bytes());
        buf.extend_from_slice(self.id.as_bytes());
        buf.push(u8::from(self.is_tombstone));
        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        let checksum = crc32(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Decodes one record from `data`, verifying length and checksum.
    ///
    /// `offset` is the record's position in the log, used only for error
    /// context. Returns the record and the number of bytes consumed.
    pub fn decode(data: &[u8], offset: u64) -> StoreResult<(Self, usize)> {
        if data.len() < MIN_RECORD_LEN {
            return Err(StoreError::corruption(
                offset,
                format!("record too short: {} bytes", data.len()),
            ));
        }

        let record_len =
            u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if record_len < MIN_RECORD_LEN || record_len > data.len() {
            return Err(StoreError::corruption(
                offset,
                format!("invalid record length {}", record_len),
            ));
        }

        let checksum_at = record_len - 4;
        let stored = u32::from_le_bytes([
            data[checksum_at],
            data[checksum_at + 1],
            data[checksum_at + 2],
            data[checksum_at + 3],
        ]);
        let computed = crc32(&data[..checksum_at]);
        if stored != computed {
            return Err(StoreError::corruption(
                offset,
                format!("checksum mismatch: stored {:08x}, computed {:08x}", stored, computed),
            ));
        }

        let mut cursor = Cursor {
            data: &data[4..checksum_at],
            pos: 0,
            offset,
        };

        let project_bytes = cursor.take_prefixed()?;
        let project = String::from_utf8(project_bytes.to_vec()).map_err(|e| {
            StoreError::corruption(offset, format!("project is not UTF-8: {}", e))
        })?;

        let id_bytes: [u8; 16] = cursor
            .take(16)?
            .try_into()
            .map_err(|_| StoreError::corruption(offset, "truncated issue id"))?;
        let id = Uuid::from_bytes(id_bytes);

        let is_tombstone = cursor.take(1)?[0] != 0;
        let body = cursor.take_prefixed()?.to_vec();

        Ok((
            Self {
                project,
                id,
                is_tombstone,
                body,
            },
            record_len,
        ))
    }
}

fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Bounds-checked reads over the record body.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    offset: u64,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> StoreResult<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(StoreError::corruption(self.offset, "truncated record body"));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_prefixed(&mut self) -> StoreResult<&'a [u8]> {
        let len_bytes = self.take(4)?;
        let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
        self.take(len as usize)
    }
}
