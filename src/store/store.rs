//! # Issue Store
//!
//! The persistence collaborator behind the request handlers. State is a
//! per-project collection map held in memory and rebuilt from the issue log
//! on open; every mutation appends a durable record before it is reflected
//! in memory, so the log is always at least as new as the in-memory view.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::log::{LogReader, LogWriter};
use super::record::LogRecord;
use crate::issue::{Issue, IssueChanges, IssueDraft, IssueQuery};
use crate::observability::Logger;

/// Embedded document store for issues, partitioned by project.
pub struct IssueStore {
    /// project -> issues in insertion order
    collections: HashMap<String, Vec<Issue>>,
    log: LogWriter,
}

impl IssueStore {
    /// Opens the store, replaying the full log to rebuild in-memory state.
    ///
    /// Replay applies records in order: an upsert replaces the issue in
    /// place (or appends it), a tombstone removes it. Any corrupt record
    /// aborts the open.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let log = LogWriter::open(data_dir)?;

        let mut collections: HashMap<String, Vec<Issue>> = HashMap::new();
        let mut reader = LogReader::open(log.path())?;
        let mut replayed: u64 = 0;

        while let Some(record) = reader.read_next()? {
            let issues = collections.entry(record.project.clone()).or_default();
            if record.is_tombstone {
                issues.retain(|issue| issue.id != record.id);
            } else {
                let offset = reader.offset();
                let issue = record.issue().map_err(|e| {
                    StoreError::corruption(offset, format!("undecodable issue body: {}", e))
                })?;
                match issues.iter_mut().find(|i| i.id == issue.id) {
                    Some(existing) => *existing = issue,
                    None => issues.push(issue),
                }
            }
            replayed += 1;
        }

        let replayed_str = replayed.to_string();
        Logger::info("STORE_OPENED", &[("records_replayed", replayed_str.as_str())]);

        Ok(Self { collections, log })
    }

    /// Number of live issues across all projects.
    pub fn issue_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Inserts a new issue into a project, assigning its identifier.
    pub fn insert(
        &mut self,
        project: &str,
        draft: IssueDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Issue> {
        let issue = Issue::create(Uuid::new_v4(), draft, now);

        self.log.append(&LogRecord::upsert(project, &issue)?)?;
        self.collections
            .entry(project.to_string())
            .or_default()
            .push(issue.clone());

        Ok(issue)
    }

    /// Finds all issues in a project matching the query, in insertion order.
    ///
    /// A malformed `_id` in the query is an `InvalidId` error; it is not
    /// validated earlier.
    pub fn find(&self, project: &str, query: &IssueQuery) -> StoreResult<Vec<Issue>> {
        let id = query.id.as_deref().map(parse_id).transpose()?;

        let issues = match self.collections.get(project) {
            Some(issues) => issues,
            None => return Ok(Vec::new()),
        };

        Ok(issues
            .iter()
            .filter(|issue| id.map_or(true, |id| issue.id == id))
            .filter(|issue| query.filter.matches(issue))
            .cloned()
            .collect())
    }

    /// Applies a change set to the single issue with the given identifier,
    /// refreshing its `updated_on`.
    pub fn update(
        &mut self,
        raw_id: &str,
        changes: &IssueChanges,
        now: DateTime<Utc>,
    ) -> StoreResult<Issue> {
        let id = parse_id(raw_id)?;
        let (project, pos) = self
            .locate(id)
            .ok_or_else(|| StoreError::NotFound(raw_id.to_string()))?;

        // Mutate a copy, make it durable, then commit to memory.
        let mut updated = self
            .collections
            .get(&project)
            .and_then(|issues| issues.get(pos))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(raw_id.to_string()))?;
        changes.apply(&mut updated, now);

        self.log.append(&LogRecord::upsert(&project, &updated)?)?;
        if let Some(issues) = self.collections.get_mut(&project) {
            issues[pos] = updated.clone();
        }

        Ok(updated)
    }

    /// Permanently removes the issue with the given identifier.
    pub fn delete(&mut self, raw_id: &str) -> StoreResult<()> {
        let id = parse_id(raw_id)?;
        let (project, pos) = self
            .locate(id)
            .ok_or_else(|| StoreError::NotFound(raw_id.to_string()))?;

        self.log.append(&LogRecord::tombstone(&project, id))?;
        if let Some(issues) = self.collections.get_mut(&project) {
            issues.remove(pos);
        }

        Ok(())
    }

    fn locate(&self, id: Uuid) -> Option<(String, usize)> {
        self.collections.iter().find_map(|(project, issues)| {
            issues
                .iter()
                .position(|issue| issue.id == id)
                .map(|pos| (project.clone(), pos))
        })
    }
}

fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
