// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding backends
//!
//! The ranker talks to embeddings through the [`TextEmbedder`] trait so it
//! can run against the real ONNX model, the process-wide [`ModelSlot`], or a
//! deterministic hash-based backend in offline tests.

pub mod onnx_model;
pub mod slot;

pub use onnx_model::OnnxEmbeddingModel;
pub use slot::{ModelSlot, ModelState};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedding dimensionality of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// A source of fixed-dimension sentence embeddings.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts into fixed-dimension vectors, one per input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Deterministic hash-seeded embedder.
///
/// Produces stable pseudo-random vectors from the text alone, so tests and
/// offline runs never touch model files or the network. Not semantically
/// meaningful.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(anyhow!("Embedding dimension must be greater than 0"));
        }
        Ok(Self { dimension })
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);

        // Linear congruential generator for deterministic pseudo-random values
        let mut current_seed = seed;
        for i in 0..self.dimension {
            current_seed =
                (current_seed.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);

            // Convert to float in range [-1, 1]
            let value = (current_seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        // Normalize to unit length
        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl TextEmbedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.generate(text)).collect())
    }
}
