// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide embedding model slot
//!
//! The model is expensive to load and read-only afterwards, so it is loaded
//! once per process by a background task while the HTTP server starts
//! serving. The boundary layer consults [`ModelSlot::state`] for readiness;
//! embedding calls made before the load completes (or after it fails) return
//! an error, which the ranker recovers from with its first-candidate
//! fallback.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

use super::{OnnxEmbeddingModel, TextEmbedder};

/// Lifecycle of the process-wide embedding model.
#[derive(Debug, Clone)]
pub enum ModelState {
    /// Background load still in progress
    Loading,
    /// Model loaded and serving
    Ready(Arc<OnnxEmbeddingModel>),
    /// Load failed; the node keeps serving with degraded ranking
    Failed(String),
}

impl ModelState {
    /// Short machine-readable label for health reporting.
    pub fn label(&self) -> &'static str {
        match self {
            ModelState::Loading => "loading",
            ModelState::Ready(_) => "ready",
            ModelState::Failed(_) => "failed",
        }
    }
}

/// Shared handle to the process-wide embedding model.
#[derive(Clone)]
pub struct ModelSlot {
    inner: Arc<RwLock<ModelState>>,
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSlot {
    /// Creates an empty slot in the `Loading` state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ModelState::Loading)),
        }
    }

    /// Creates a slot that is already `Ready` with the given model.
    pub fn with_model(model: OnnxEmbeddingModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ModelState::Ready(Arc::new(model)))),
        }
    }

    /// Spawns a background task that loads the model and publishes the
    /// resulting state. Returns immediately.
    pub fn spawn_load(
        &self,
        model_name: impl Into<String>,
        model_path: impl Into<String>,
        tokenizer_path: impl Into<String>,
    ) {
        let inner = Arc::clone(&self.inner);
        let model_name = model_name.into();
        let model_path = model_path.into();
        let tokenizer_path = tokenizer_path.into();

        tokio::spawn(async move {
            info!("Loading embedding model: {}", model_name);
            match OnnxEmbeddingModel::new(model_name.clone(), model_path, tokenizer_path).await {
                Ok(model) => {
                    info!(
                        "Embedding model ready: {} ({} dimensions)",
                        model_name,
                        model.dimension()
                    );
                    *inner.write().unwrap() = ModelState::Ready(Arc::new(model));
                }
                Err(e) => {
                    error!("Failed to load embedding model {}: {}", model_name, e);
                    *inner.write().unwrap() = ModelState::Failed(e.to_string());
                }
            }
        });
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> ModelState {
        self.inner.read().unwrap().clone()
    }

    /// Whether the model load is still in progress.
    pub fn is_loading(&self) -> bool {
        matches!(*self.inner.read().unwrap(), ModelState::Loading)
    }

    /// Returns the loaded model, if any.
    pub fn current(&self) -> Option<Arc<OnnxEmbeddingModel>> {
        match &*self.inner.read().unwrap() {
            ModelState::Ready(model) => Some(Arc::clone(model)),
            _ => None,
        }
    }
}

#[async_trait]
impl TextEmbedder for ModelSlot {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self.current() {
            Some(model) => model.embed_batch(texts).await,
            None => Err(anyhow!("embedding model is not available")),
        }
    }
}
