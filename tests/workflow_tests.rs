//! End-to-end workflow tests
//!
//! Serve fixture pages from an ephemeral local listener, run the full
//! fetch → rank → render pipeline against them, and check the documents
//! that land in storage. The deterministic hash embedder stands in for the
//! ONNX model so these tests never touch the network or model files.

use axum::{response::Html, routing::get, Router};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fabstir_curation_node::{
    api::{router, AppState},
    content::{ContentFetchConfig, ContentFetcher, FetchError},
    document::PdfRenderer,
    embeddings::{HashEmbedder, ModelSlot},
    pipeline::{CurationPipeline, WorkflowError},
};

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Essays</title></head>
<body>
  <nav>Home | Archive | About</nav>
  <article>
    <h2>My Title</h2>
    <p>Machine learning systems keep improving because researchers publish their methods openly
    and benchmark them against shared datasets in every conference cycle.</p>
    <p>The discipline rewards careful measurement: a model that cannot be evaluated against a
    baseline is a demo, not a result, and reviewers know the difference.</p>
    <p>Students entering the field should therefore learn evaluation before architecture,
    since knowing what to measure outlasts any particular network design.</p>
  </article>
  <footer>Copyright notice</footer>
</body>
</html>
"#;

const THIN_PAGE: &str = "<html><body><p>nothing much here</p></body></html>";

async fn spawn_fixture_server() -> SocketAddr {
    let app = Router::new()
        .route("/essay", get(|| async { Html(ARTICLE_PAGE) }))
        .route("/thin", get(|| async { Html(THIN_PAGE) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_pipeline(storage: &std::path::Path) -> CurationPipeline {
    CurationPipeline::new(
        ContentFetcher::new(ContentFetchConfig::default()),
        Arc::new(HashEmbedder::new(64).unwrap()),
        PdfRenderer::new(storage),
    )
}

#[tokio::test]
async fn end_to_end_article_workflow() {
    let addr = spawn_fixture_server().await;
    let tmp = tempfile::tempdir().unwrap();

    let path = test_pipeline(tmp.path())
        .run(&format!("http://{addr}/essay"), "machine learning")
        .await
        .unwrap();

    let filename = path.file_name().unwrap().to_string_lossy();
    let pattern = Regex::new(
        r"^NotebookLM_My_Title_machine_learning_\d{8}_\d{6}\.pdf$",
    )
    .unwrap();
    assert!(
        pattern.is_match(&filename),
        "unexpected filename: {filename}"
    );

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[tokio::test]
async fn extractor_sees_single_article_candidate() {
    let addr = spawn_fixture_server().await;
    let fetcher = ContentFetcher::new(ContentFetchConfig::default());

    let candidates = fetcher
        .fetch_candidates(&format!("http://{addr}/essay"))
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "My Title");
    assert!(candidates[0].content.chars().count() > 300);
    assert!(!candidates[0].content.contains("Archive"));
}

#[tokio::test]
async fn thin_page_still_produces_document() {
    let addr = spawn_fixture_server().await;
    let tmp = tempfile::tempdir().unwrap();

    let path = test_pipeline(tmp.path())
        .run(&format!("http://{addr}/thin"), "anything")
        .await
        .unwrap();

    // The sentinel candidate flows all the way to a rendered document
    let filename = path.file_name().unwrap().to_string_lossy();
    assert!(filename.starts_with("NotebookLM_No_Content_Found_"));
    assert!(path.exists());
}

#[tokio::test]
async fn missing_page_is_fetch_error() {
    let addr = spawn_fixture_server().await;
    let tmp = tempfile::tempdir().unwrap();

    let result = test_pipeline(tmp.path())
        .run(&format!("http://{addr}/missing"), "query")
        .await;

    match result {
        Err(WorkflowError::Fetch(FetchError::HttpStatus(404, _))) => {}
        other => panic!("expected 404 fetch error, got {other:?}"),
    }
}

/// Boundary state with the model slot in a chosen lifecycle position.
async fn spawn_api_server(models: ModelSlot, storage: std::path::PathBuf) -> SocketAddr {
    let pipeline = Arc::new(CurationPipeline::new(
        ContentFetcher::new(ContentFetchConfig::default()),
        Arc::new(models.clone()),
        PdfRenderer::new(storage.clone()),
    ));
    let app = router(AppState::new(pipeline, models, storage));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn process_endpoint_unavailable_while_model_loads() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_api_server(ModelSlot::new(), tmp.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/process"))
        .form(&[("url", "example.com"), ("query", "rust")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 503);
    let payload: serde_json::Value = response.json().await.unwrap();
    assert_eq!(payload["error_type"], "service_unavailable");
}

#[tokio::test]
async fn process_endpoint_degrades_when_model_failed() {
    let fixture_addr = spawn_fixture_server().await;
    let tmp = tempfile::tempdir().unwrap();

    // Force the slot into the failed state; the workflow must still complete
    // with first-candidate ranking.
    let models = ModelSlot::new();
    models.spawn_load("all-MiniLM-L6-v2", "/nonexistent/model.onnx", "/nonexistent/tok.json");
    for _ in 0..100 {
        if !models.is_loading() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!models.is_loading(), "model load did not settle");

    let api_addr = spawn_api_server(models, tmp.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{api_addr}/process"))
        .form(&[
            ("url", format!("http://{fixture_addr}/essay")),
            ("query", "machine learning".to_string()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let payload: serde_json::Value = response.json().await.unwrap();
    assert_eq!(payload["success"], true);

    let filename = payload["filename"].as_str().unwrap();
    assert!(filename.starts_with("NotebookLM_My_Title_machine_learning_"));

    // The generated document is downloadable through the boundary
    let download = client
        .get(format!("http://{api_addr}/download/{filename}"))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status().as_u16(), 200);
    assert_eq!(
        download.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let bytes = download.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn download_rejects_unknown_files() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_api_server(ModelSlot::new(), tmp.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/download/nope.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn health_reports_model_state() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_api_server(ModelSlot::new(), tmp.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let payload: serde_json::Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["model"], "loading");
}
