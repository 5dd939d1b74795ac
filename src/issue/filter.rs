//! # List Query Construction
//!
//! Turns raw query parameters into a typed query: an optional identifier
//! (parsed later by the store) plus a conjunction of equality clauses over
//! the recognized filter fields.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::fields::{is_present, project_present, LIST_FIELDS};
use super::model::Issue;

/// A parsed list query.
#[derive(Debug, Clone, Default)]
pub struct IssueQuery {
    /// Raw `_id` parameter, if supplied. Validation is the store's job; a
    /// malformed value surfaces as a store error, not a rejected request.
    pub id: Option<String>,

    /// Equality clauses over the whitelisted fields.
    pub filter: IssueFilter,
}

impl IssueQuery {
    /// Builds a query from URL query parameters.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let source: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let id = source
            .get("_id")
            .filter(|v| is_present(v))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            id,
            filter: IssueFilter::from_fields(&project_present(&source, LIST_FIELDS)),
        }
    }
}

/// A set of equality clauses combined with AND logic.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    clauses: Vec<(String, Value)>,
}

impl IssueFilter {
    /// Builds a filter from a projected field map.
    ///
    /// Query parameters arrive as strings; `open` is cast to a boolean so it
    /// compares against the stored flag.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let clauses = fields
            .iter()
            .map(|(field, value)| (field.clone(), coerce(field, value)))
            .collect();
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether the issue satisfies every clause.
    pub fn matches(&self, issue: &Issue) -> bool {
        match serde_json::to_value(issue) {
            Ok(doc) => self
                .clauses
                .iter()
                .all(|(field, value)| doc.get(field) == Some(value)),
            Err(_) => false,
        }
    }
}

fn coerce(field: &str, value: &Value) -> Value {
    if field == "open" {
        if let Some(s) = value.as_str() {
            match s {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            }
        }
    }
    value.clone()
}
