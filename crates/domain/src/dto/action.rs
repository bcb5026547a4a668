use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{DomainError, Result};

/// Reply shape shared by every mutation endpoint.
///
/// Endpoints are inconsistent: some send `success`, some only send `error` on
/// failure, and some add a `message` or an `updated` count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub updated: Option<u64>,
}

impl ActionResponse {
    /// `implicit_success` decides the outcome when the server omits `success`.
    pub fn is_success(&self, implicit_success: bool) -> bool {
        if self.error.is_some() {
            return false;
        }
        self.success.unwrap_or(implicit_success)
    }

    /// The server error string, or `"Unknown error"` when none was sent.
    pub fn error_text(&self) -> &str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or("Unknown error")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct BulkStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    #[validate(length(min = 1, message = "Please select at least one result"))]
    pub result_ids: Vec<String>,
}

impl BulkStatusRequest {
    pub fn new(status: impl Into<String>, result_ids: Vec<String>) -> Result<Self> {
        let request = Self {
            status: status.into().trim().to_string(),
            result_ids,
        };
        request.check()?;
        Ok(request)
    }

    pub fn check(&self) -> Result<()> {
        self.validate().map_err(DomainError::from_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_resolution() {
        let ok: ActionResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ok.is_success(false));

        let failed: ActionResponse =
            serde_json::from_str(r#"{"success": false, "error": "Game locked"}"#).unwrap();
        assert!(!failed.is_success(true));
        assert_eq!(failed.error_text(), "Game locked");

        let bare: ActionResponse = serde_json::from_str("{}").unwrap();
        assert!(bare.is_success(true));
        assert!(!bare.is_success(false));
        assert_eq!(bare.error_text(), "Unknown error");

        let error_only: ActionResponse = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert!(!error_only.is_success(true));
    }

    #[test]
    fn test_updated_count_is_read() {
        let response: ActionResponse =
            serde_json::from_str(r#"{"success": true, "updated": 14}"#).unwrap();
        assert_eq!(response.updated, Some(14));
    }

    #[test]
    fn test_bulk_status_requires_selection() {
        let err = BulkStatusRequest::new("official", Vec::new()).unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Please select at least one result".to_string())
        );

        let request = BulkStatusRequest::new(" official ", vec!["4".to_string()]).unwrap();
        assert_eq!(request.status, "official");
    }
}
