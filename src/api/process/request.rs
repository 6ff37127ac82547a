// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ProcessRequest type for POST /process
//!
//! Carries the form fields of the curation workflow with validation and
//! URL scheme normalization.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for the POST /process endpoint
///
/// # Fields
/// - `url`: Page to curate content from
/// - `query`: Research query used for relevance ranking
///
/// # Example
/// ```json
/// {
///   "url": "https://example.com/essays",
///   "query": "machine learning"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// Page URL; a missing scheme is normalized to https
    pub url: String,

    /// Research query; must be non-empty
    pub query: String,
}

impl ProcessRequest {
    /// Validates the process request
    ///
    /// # Validation Rules
    /// 1. **url**: must be non-empty after trimming
    /// 2. **query**: must be non-empty after trimming
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.url.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "url".to_string(),
                message: "Please provide a valid URL".to_string(),
            });
        }

        if self.query.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "query".to_string(),
                message: "Please provide a research query".to_string(),
            });
        }

        Ok(())
    }

    /// Trimmed URL with an https scheme prepended when none is present.
    pub fn normalized_url(&self) -> String {
        let url = self.url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        }
    }

    /// Trimmed research query.
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_string()
    }
}
