//! # API Errors
//!
//! Two tiers. Validation and mutation failures are part of the wire
//! contract: they travel as HTTP 200 with an `error` body, some echoing the
//! identifier the client sent. Store and internal failures on the read and
//! create paths surface as 500 with the error message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::response::ErrorBody;
use crate::store::StoreError;

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Request handling errors. The `#[error]` strings are the exact wire
/// messages.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Create request without all of issue_title, issue_text, created_by.
    #[error("required field(s) missing")]
    RequiredFieldsMissing,

    /// Update or delete request without an `_id`.
    #[error("missing _id")]
    MissingId,

    /// Update request whose change set is empty after projection.
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    /// Update failed: malformed id, unknown id, or store failure alike.
    #[error("could not update")]
    CouldNotUpdate { id: String },

    /// Delete failed: malformed id, unknown id, or store failure alike.
    #[error("could not delete")]
    CouldNotDelete { id: String },

    /// Store failure on a read or create path.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Shared state failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RequiredFieldsMissing
            | ApiError::MissingId
            | ApiError::NoUpdateFields { .. }
            | ApiError::CouldNotUpdate { .. }
            | ApiError::CouldNotDelete { .. } => StatusCode::OK,

            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The identifier echoed back alongside the error, where the contract
    /// demands it.
    pub fn echoed_id(&self) -> Option<&str> {
        match self {
            ApiError::NoUpdateFields { id }
            | ApiError::CouldNotUpdate { id }
            | ApiError::CouldNotDelete { id } => Some(id),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            id: self.echoed_id().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
