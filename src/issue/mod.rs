//! Issue domain: the record type, whitelist projection, and query building.

pub mod fields;
pub mod filter;
pub mod model;

pub use fields::{is_present, project_present, CREATE_FIELDS, LIST_FIELDS, UPDATE_FIELDS};
pub use filter::{IssueFilter, IssueQuery};
pub use model::{Issue, IssueChanges, IssueDraft};
