// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Workflow orchestration
//!
//! Sequences the three pipeline stages for one request:
//!
//! ```text
//! URL ──fetch──▶ Vec<Candidate> ──rank──▶ SelectedCandidate ──render──▶ path
//! ```
//!
//! One invocation runs one fetch, one embedding pass and one file write,
//! sequentially, with no retries. Stage failures are terminal except the
//! ranker's embedding failure, which degrades to the first candidate.

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::content::{ContentFetcher, FetchError};
use crate::document::{generate_filename, PdfRenderer, RenderError, SelectedCandidate};
use crate::embeddings::TextEmbedder;
use crate::ranking::rank_by_relevance;

/// Workflow error types; each is terminal for the invocation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Network or parse failure while retrieving the page
    #[error("content fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// The ranker produced no candidate. The fetcher's sentinel guarantee
    /// makes this unreachable in practice; modeled defensively.
    #[error("no relevant content found")]
    NoContent,
    /// Document rendering or filesystem failure
    #[error("document generation failed: {0}")]
    Render(#[from] RenderError),
}

/// The full fetch → rank → render pipeline.
pub struct CurationPipeline {
    fetcher: ContentFetcher,
    embedder: Arc<dyn TextEmbedder>,
    renderer: PdfRenderer,
}

impl CurationPipeline {
    pub fn new(
        fetcher: ContentFetcher,
        embedder: Arc<dyn TextEmbedder>,
        renderer: PdfRenderer,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            renderer,
        }
    }

    /// Run one workflow invocation and return the path of the generated PDF.
    ///
    /// `url` must carry an http/https scheme (the boundary normalizes bare
    /// hosts); `query` is the user's research query.
    pub async fn run(&self, url: &str, query: &str) -> Result<PathBuf, WorkflowError> {
        info!("Starting workflow for URL: {} (query: {})", url, query);

        let candidates = self.fetcher.fetch_candidates(url).await?;
        info!("Found {} content section(s)", candidates.len());

        let best = rank_by_relevance(&candidates, query, self.embedder.as_ref())
            .await
            .ok_or(WorkflowError::NoContent)?;

        let selected = SelectedCandidate {
            candidate: best,
            query_used: (!query.is_empty()).then(|| query.to_string()),
        };

        // One clock sample feeds both the filename and the PDF metadata line
        let now = Local::now();
        let filename = generate_filename(&selected.candidate.title, query, now);

        let path = self.renderer.render(&selected, url, &filename, now)?;
        info!("Workflow completed: {}", path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentFetchConfig;
    use crate::embeddings::HashEmbedder;

    fn pipeline(storage: &std::path::Path) -> CurationPipeline {
        CurationPipeline::new(
            ContentFetcher::new(ContentFetchConfig::default()),
            Arc::new(HashEmbedder::new(64).unwrap()),
            PdfRenderer::new(storage),
        )
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = pipeline(tmp.path()).run("not a url", "query").await;
        assert!(matches!(
            result,
            Err(WorkflowError::Fetch(FetchError::InvalidUrl(_)))
        ));
    }
}
