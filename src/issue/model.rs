//! # Issue Record
//!
//! The issue document and its construction paths. Timestamps are set
//! explicitly by the constructors below; nothing mutates them behind the
//! caller's back. The owning project is not part of the record: the store
//! partitions by project, and responses never include it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::fields::{open_field, string_field};

/// A tracked work item scoped to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Store-assigned identifier, immutable after creation.
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,

    /// False once the issue is closed.
    pub open: bool,

    /// Set once at creation.
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,

    /// Refreshed on every successful mutation.
    #[serde(with = "timestamp")]
    pub updated_on: DateTime<Utc>,
}

impl Issue {
    /// Materializes a new issue from a draft.
    ///
    /// Both timestamps start equal, so `created_on <= updated_on` holds from
    /// the first write onward.
    pub fn create(id: Uuid, draft: IssueDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            issue_title: draft.issue_title,
            issue_text: draft.issue_text,
            created_by: draft.created_by,
            assigned_to: draft.assigned_to,
            status_text: draft.status_text,
            open: true,
            created_on: now,
            updated_on: now,
        }
    }
}

/// Client-supplied fields for a new issue, already whitelist-projected.
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl IssueDraft {
    /// Builds a draft from a projected field map. Optional fields default to
    /// the empty string.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            issue_title: string_field(fields, "issue_title").unwrap_or_default(),
            issue_text: string_field(fields, "issue_text").unwrap_or_default(),
            created_by: string_field(fields, "created_by").unwrap_or_default(),
            assigned_to: string_field(fields, "assigned_to").unwrap_or_default(),
            status_text: string_field(fields, "status_text").unwrap_or_default(),
        }
    }
}

/// A change set for an existing issue. Absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueChanges {
    /// Builds a change set from a projected field map.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            issue_title: string_field(fields, "issue_title"),
            issue_text: string_field(fields, "issue_text"),
            created_by: string_field(fields, "created_by"),
            assigned_to: string_field(fields, "assigned_to"),
            status_text: string_field(fields, "status_text"),
            open: open_field(fields),
        }
    }

    /// True when no recognized field survived projection.
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Applies the change set and refreshes `updated_on`.
    pub fn apply(&self, issue: &mut Issue, now: DateTime<Utc>) {
        if let Some(v) = &self.issue_title {
            issue.issue_title = v.clone();
        }
        if let Some(v) = &self.issue_text {
            issue.issue_text = v.clone();
        }
        if let Some(v) = &self.created_by {
            issue.created_by = v.clone();
        }
        if let Some(v) = &self.assigned_to {
            issue.assigned_to = v.clone();
        }
        if let Some(v) = &self.status_text {
            issue.status_text = v.clone();
        }
        if let Some(v) = self.open {
            issue.open = v;
        }
        issue.updated_on = now;
    }
}

/// Millisecond-precision RFC 3339 timestamps on the wire.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
