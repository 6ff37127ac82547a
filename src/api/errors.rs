// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::content::FetchError;
use crate::pipeline::WorkflowError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    /// The upstream page fetch failed
    UpstreamFetch(String),
    ServiceUnavailable(String),
    InternalError(String),
    Timeout,
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::UpstreamFetch(msg) => ("upstream_fetch_error", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
            ApiError::Timeout => ("timeout", "Request timed out".to_string(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::UpstreamFetch(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::InternalError(_) => 500,
            ApiError::Timeout => 504,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UpstreamFetch(msg) => write!(f, "Upstream fetch error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Fetch(FetchError::Timeout(_)) => ApiError::Timeout,
            WorkflowError::Fetch(FetchError::InvalidUrl(url)) => {
                ApiError::InvalidRequest(format!("Invalid URL: {}", url))
            }
            WorkflowError::Fetch(e) => ApiError::UpstreamFetch(e.to_string()),
            WorkflowError::NoContent => {
                ApiError::NotFound("No relevant content found".to_string())
            }
            WorkflowError::Render(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RenderError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(ApiError::UpstreamFetch("x".into()).status_code(), 502);
        assert_eq!(ApiError::ServiceUnavailable("x".into()).status_code(), 503);
        assert_eq!(ApiError::InternalError("x".into()).status_code(), 500);
        assert_eq!(ApiError::Timeout.status_code(), 504);
    }

    #[test]
    fn test_validation_error_details() {
        let err = ApiError::ValidationError {
            field: "url".to_string(),
            message: "url is required".to_string(),
        };
        let response = err.to_response(None);
        assert_eq!(response.error_type, "validation_error");
        let details = response.details.unwrap();
        assert_eq!(details["field"], serde_json::json!("url"));
    }

    #[test]
    fn test_workflow_error_mapping() {
        let err: ApiError = WorkflowError::Fetch(FetchError::HttpStatus(
            500,
            "https://example.com".to_string(),
        ))
        .into();
        assert_eq!(err.status_code(), 502);

        let err: ApiError =
            WorkflowError::Fetch(FetchError::Timeout("https://example.com".to_string())).into();
        assert_eq!(err.status_code(), 504);

        let err: ApiError = WorkflowError::NoContent.into();
        assert_eq!(err.status_code(), 404);

        let err: ApiError = WorkflowError::Render(RenderError::Pdf("boom".to_string())).into();
        assert_eq!(err.status_code(), 500);
    }
}
