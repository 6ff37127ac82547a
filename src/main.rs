// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_curation_node::{
    api::{start_server, AppState},
    content::{ContentFetchConfig, ContentFetcher},
    document::PdfRenderer,
    embeddings::ModelSlot,
    pipeline::CurationPipeline,
    version,
};
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("Starting Fabstir Curation Node...\n");
    println!("BUILD VERSION: {}", version::VERSION);
    println!();

    // Parse environment variables for configuration
    let api_port = env::var("API_PORT").unwrap_or_else(|_| "8080".to_string());
    let storage_dir = PathBuf::from(
        env::var("PDF_STORAGE_DIR").unwrap_or_else(|_| "generated_pdfs".to_string()),
    );
    let model_path = env::var("EMBEDDING_MODEL_PATH")
        .unwrap_or_else(|_| "./models/all-MiniLM-L6-v2-onnx/model.onnx".to_string());
    let tokenizer_path = env::var("EMBEDDING_TOKENIZER_PATH")
        .unwrap_or_else(|_| "./models/all-MiniLM-L6-v2-onnx/tokenizer.json".to_string());

    let fetch_config = ContentFetchConfig::from_env();
    fetch_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid fetch configuration: {e}"))?;

    // The embedding model loads in the background; the boundary answers 503
    // for workflow requests until it is ready
    let models = ModelSlot::new();
    models.spawn_load("all-MiniLM-L6-v2", model_path, tokenizer_path);

    let fetcher = ContentFetcher::new(fetch_config);
    let renderer = PdfRenderer::new(storage_dir.clone());
    let pipeline = Arc::new(CurationPipeline::new(
        fetcher,
        Arc::new(models.clone()),
        renderer,
    ));

    println!("PDFs will be stored in: {}", storage_dir.display());

    let state = AppState::new(pipeline, models, storage_dir);
    let addr: SocketAddr = format!("0.0.0.0:{api_port}").parse()?;

    start_server(addr, state).await
}
