// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP boundary for the curation node
//!
//! Serves the submission form, runs the workflow, and streams generated
//! documents back out of the flat storage directory.

use axum::{
    extract::{Form, Path as UrlPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use super::{
    process::{ProcessRequest, ProcessResponse},
    ApiError,
};
use crate::embeddings::ModelSlot;
use crate::pipeline::CurationPipeline;
use crate::version;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<CurationPipeline>,
    models: ModelSlot,
    storage_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: Arc<CurationPipeline>, models: ModelSlot, storage_dir: PathBuf) -> Self {
        Self {
            pipeline,
            models,
            storage_dir,
        }
    }
}

/// JSON error wrapper so handlers can use `?` with [`ApiError`].
pub struct ApiErrorResponse(pub ApiError);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_response(None))).into_response()
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router; separated from [`start_server`] for tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Submission form
        .route("/", get(index_handler))
        // Workflow endpoint
        .route("/process", post(process_handler))
        // Document retrieval
        .route("/download/:filename", get(download_handler))
        .route("/view/:filename", get(view_handler))
        .route("/list-pdfs", get(list_pdfs_handler))
        // Health check
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Website to NotebookLM</title></head>
<body>
  <h1>Website to NotebookLM</h1>
  <form id="curation-form">
    <label>Website URL <input type="text" name="url" placeholder="example.com/essays" required></label><br>
    <label>Research query <input type="text" name="query" placeholder="machine learning" required></label><br>
    <button type="submit">Generate PDF</button>
  </form>
  <pre id="result"></pre>
  <script>
    const form = document.getElementById('curation-form');
    const result = document.getElementById('result');
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      result.textContent = 'Processing...';
      const response = await fetch('/process', {
        method: 'POST',
        headers: {'Content-Type': 'application/x-www-form-urlencoded'},
        body: new URLSearchParams(new FormData(form)),
      });
      const payload = await response.json();
      if (response.ok) {
        result.innerHTML = 'Done: <a href="' + payload.downloadUrl + '">' + payload.filename + '</a>';
      } else {
        result.textContent = 'Error: ' + payload.message;
      }
    });
  </script>
</body>
</html>
"#;

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn process_handler(
    State(state): State<AppState>,
    Form(request): Form<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiErrorResponse> {
    if state.models.is_loading() {
        return Err(ApiError::ServiceUnavailable(
            "Embedding model is still loading, try again shortly".to_string(),
        )
        .into());
    }

    request.validate().map_err(ApiErrorResponse)?;

    let url = request.normalized_url();
    let query = request.normalized_query();

    let path = state.pipeline.run(&url, &query).await.map_err(|e| {
        error!("Workflow failed for {}: {}", url, e);
        ApiErrorResponse(ApiError::from(e))
    })?;

    Ok(Json(ProcessResponse::from_path(&path)))
}

async fn download_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiErrorResponse> {
    serve_pdf(&state, &filename, true).await
}

async fn view_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiErrorResponse> {
    serve_pdf(&state, &filename, false).await
}

/// Stream a stored PDF, as attachment or inline.
///
/// Filenames derived from user input must stay inside the storage directory,
/// so anything with a path separator or parent reference is rejected.
async fn serve_pdf(
    state: &AppState,
    filename: &str,
    as_attachment: bool,
) -> Result<Response, ApiErrorResponse> {
    if !is_safe_filename(filename) {
        return Err(ApiError::NotFound("File not found or invalid path".to_string()).into());
    }

    let path = state.storage_dir.join(filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("File not found or invalid path".to_string()))?;

    let disposition = if as_attachment {
        format!("attachment; filename=\"{filename}\"")
    } else {
        "inline".to_string()
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Reject names that could escape the flat storage directory.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

async fn list_pdfs_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiErrorResponse> {
    let mut files = Vec::new();

    let mut entries = match tokio::fs::read_dir(&state.storage_dir).await {
        Ok(entries) => entries,
        // Directory not created yet means no documents were generated
        Err(_) => return Ok(Json(json!({ "pdfs": files }))),
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".pdf") {
            continue;
        }

        let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
        files.push(json!({
            "name": name,
            "size": format_size(size),
            "downloadUrl": format!("/download/{name}"),
            "viewUrl": format!("/view/{name}"),
        }));
    }

    Ok(Json(json!({ "pdfs": files })))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model": state.models.state().label(),
        "version": version::VERSION_NUMBER,
    }))
}

fn format_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filenames() {
        assert!(is_safe_filename("NotebookLM_Content_20250805_143009.pdf"));
        assert!(is_safe_filename("report.pdf"));
    }

    #[test]
    fn test_traversal_filenames_rejected() {
        assert!(!is_safe_filename("../secrets.txt"));
        assert!(!is_safe_filename("..\\secrets.txt"));
        assert!(!is_safe_filename("a/b.pdf"));
        assert!(!is_safe_filename(""));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
    }
}
