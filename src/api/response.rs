//! # Response Bodies
//!
//! Acknowledgement and error shapes for the mutation endpoints. List and
//! create responses serialize the issue records directly.

use serde::Serialize;

/// Successful update acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAck {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

impl UpdateAck {
    pub fn new(id: String) -> Self {
        Self {
            result: "successfully updated",
            id,
        }
    }
}

/// Successful delete acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAck {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

impl DeleteAck {
    pub fn new(id: String) -> Self {
        Self {
            result: "successfully deleted",
            id,
        }
    }
}

/// Error body, with the identifier echoed where the contract demands it.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_ack_shape() {
        let ack = UpdateAck::new("abc".to_string());
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            value,
            json!({"result": "successfully updated", "_id": "abc"})
        );
    }

    #[test]
    fn test_delete_ack_shape() {
        let ack = DeleteAck::new("abc".to_string());
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            value,
            json!({"result": "successfully deleted", "_id": "abc"})
        );
    }

    #[test]
    fn test_error_body_omits_absent_id() {
        let body = ErrorBody {
            error: "missing _id".to_string(),
            id: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"error": "missing _id"}));
    }

    #[test]
    fn test_error_body_echoes_id() {
        let body = ErrorBody {
            error: "could not update".to_string(),
            id: Some("abc".to_string()),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"error": "could not update", "_id": "abc"}));
    }
}
