//! JSON response envelope
//!
//! Every response body, success or failure, has the same shape:
//!
//! ```json
//! {"success": true, "message": "...", "data": {...}, "timestamp": "2024-01-01T00:00:00Z"}
//! {"success": false, "message": "...", "error": {"code": "...", "message": "...", "details": "..."},
//!  "timestamp": "..."}
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Error object carried by failed responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `WALLET_NOT_FOUND`
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Standard response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Failed response without data
    ///
    /// The message is repeated inside the error object for clients that only
    /// read `error`.
    pub fn failure(
        message: impl Into<String>,
        code: &'static str,
        details: Option<String>,
    ) -> Self {
        let message = message.into();
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code,
                message: message.clone(),
                details,
            }),
            message,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_success_envelope_omits_error() {
        let response = ApiResponse::success("Wallet retrieved successfully", json!({"id": 1}));

        let value: Value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Wallet retrieved successfully");
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_failure_envelope_omits_data_and_empty_details() {
        let response = ApiResponse::failure("Wallet not found", "WALLET_NOT_FOUND", None);

        let value: Value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert_eq!(value["message"], "Wallet not found");
        assert_eq!(
            value["error"],
            json!({"code": "WALLET_NOT_FOUND", "message": "Wallet not found"})
        );
    }

    #[test]
    fn test_failure_envelope_with_details() {
        let response = ApiResponse::failure(
            "Insufficient coins balance",
            "INSUFFICIENT_BALANCE",
            Some("Current balance: 60, required: 1000".to_string()),
        );

        let value: Value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value["error"]["details"],
            "Current balance: 60, required: 1000"
        );
    }
}
