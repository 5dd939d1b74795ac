//! # Issue API Module
//!
//! HTTP surface for issue CRUD, scoped by project. Routes translate raw
//! request input into typed store operations via whitelist projection.

pub mod errors;
pub mod response;
pub mod routes;

pub use errors::{ApiError, ApiResult};
pub use response::{DeleteAck, ErrorBody, UpdateAck};
pub use routes::{issue_routes, ApiState};
