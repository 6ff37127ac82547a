// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod content;
pub mod document;
pub mod embeddings;
pub mod pipeline;
pub mod ranking;
pub mod version;

// Re-export main types
pub use api::{ApiError, AppState, ErrorResponse, ProcessRequest, ProcessResponse};
pub use content::{extract_candidates, Candidate, ContentFetchConfig, ContentFetcher, FetchError};
pub use document::{generate_filename, PdfRenderer, RenderError, SelectedCandidate};
pub use embeddings::{
    HashEmbedder, ModelSlot, ModelState, OnnxEmbeddingModel, TextEmbedder, EMBEDDING_DIM,
};
pub use pipeline::{CurationPipeline, WorkflowError};
pub use ranking::{rank_by_relevance, Embedding};
