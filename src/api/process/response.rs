// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ProcessResponse type for POST /process

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Response body for a completed curation workflow
///
/// # Example
/// ```json
/// {
///   "success": true,
///   "filename": "NotebookLM_My_Title_machine_learning_20250805_143009.pdf",
///   "path": "generated_pdfs/NotebookLM_My_Title_machine_learning_20250805_143009.pdf",
///   "downloadUrl": "/download/NotebookLM_My_Title_machine_learning_20250805_143009.pdf"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Always true for a successful workflow
    pub success: bool,

    /// Bare filename of the generated document
    pub filename: String,

    /// Storage path of the generated document
    pub path: String,

    /// Download endpoint for the document
    pub download_url: String,
}

impl ProcessResponse {
    /// Build a response from the workflow's output path.
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            success: true,
            download_url: format!("/download/{filename}"),
            path: path.display().to_string(),
            filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_path() {
        let path = PathBuf::from("generated_pdfs/NotebookLM_Content_20250805_143009.pdf");
        let response = ProcessResponse::from_path(&path);

        assert!(response.success);
        assert_eq!(response.filename, "NotebookLM_Content_20250805_143009.pdf");
        assert_eq!(
            response.download_url,
            "/download/NotebookLM_Content_20250805_143009.pdf"
        );
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let response = ProcessResponse::from_path(Path::new("out/doc.pdf"));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("downloadUrl"));
        assert!(json.contains(r#""success":true"#));
    }
}
