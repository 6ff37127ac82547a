// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running
//! the all-MiniLM-L6-v2 sentence transformer model.
//!
//! Features:
//! - ONNX model loading from disk
//! - BERT tokenization with padding/truncation
//! - Batch embedding generation
//! - Mean pooling over token embeddings
//! - 384-dimensional output vectors

use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::info;

use super::{TextEmbedder, EMBEDDING_DIM};

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// This struct wraps ONNX Runtime to provide 384-dimensional embeddings.
/// The model uses a sentence transformer architecture with:
/// - BERT-based tokenizer
/// - Mean pooling over token embeddings
///
/// # Thread Safety
/// All fields are wrapped in Arc for cheap cloning and thread-safe sharing.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session (wrapped in Arc<Mutex> for thread-safe shared access)
    session: Arc<Mutex<Session>>,

    /// BERT tokenizer
    tokenizer: Arc<Tokenizer>,

    /// Model name (e.g., "all-MiniLM-L6-v2")
    model_name: String,

    /// Output dimension (384 for all-MiniLM-L6-v2)
    dimension: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// # Arguments
    /// - `model_name`: Display name of the model
    /// - `model_path`: Path to ONNX model file (model.onnx)
    /// - `tokenizer_path`: Path to tokenizer JSON file (tokenizer.json)
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found or invalid
    /// - Tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model doesn't output 384 dimensions
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        info!("ONNX embedding model loaded from {}", model_path.display());

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // Validate output shape by running a test inference.
        // Wrap in a block to ensure outputs are dropped before moving session.
        {
            let test_encoding = tokenizer
                .encode("validation test", true)
                .map_err(|e| anyhow::anyhow!("Tokenizer validation failed: {}", e))?;

            let input_ids: Vec<i64> = test_encoding
                .get_ids()
                .iter()
                .map(|&id| id as i64)
                .collect();
            let attention_mask: Vec<i64> = test_encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> = vec![0i64; input_ids.len()];

            let input_ids_array = Array2::from_shape_vec((1, input_ids.len()), input_ids)
                .context("Failed to create input_ids array")?;
            let attention_mask_array =
                Array2::from_shape_vec((1, attention_mask.len()), attention_mask)
                    .context("Failed to create attention_mask array")?;
            let token_type_ids_array =
                Array2::from_shape_vec((1, token_type_ids.len()), token_type_ids)
                    .context("Failed to create token_type_ids array")?;

            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids_array)?,
                "attention_mask" => Value::from_array(attention_mask_array)?,
                "token_type_ids" => Value::from_array(token_type_ids_array)?
            ])?;

            // Use index [0] instead of name since different models may have
            // different output names
            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;
            let output_shape = output_tensor.shape();

            // Model outputs token-level embeddings: [batch, seq_len, hidden_dim]
            if output_shape.len() != 3 || output_shape[2] != EMBEDDING_DIM {
                anyhow::bail!(
                    "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, {}])",
                    output_shape,
                    EMBEDDING_DIM
                );
            }
        } // outputs dropped here

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: EMBEDDING_DIM,
        })
    }

    /// Generates embeddings for multiple texts in a batch
    ///
    /// # Arguments
    /// - `texts`: Array of input text strings
    ///
    /// # Returns
    /// - `Result<Vec<Vec<f32>>>`: Array of 384-dimensional embeddings
    ///
    /// # Implementation
    /// 1. Tokenize all texts with the BERT tokenizer, padding to the longest
    ///    sequence in the batch
    /// 2. Run one ONNX inference for the whole batch
    /// 3. Apply attention-masked mean pooling per item
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        // Pad all sequences to the longest in the batch
        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids_batch = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask_batch = Vec::with_capacity(texts.len() * max_len);
        let mut token_type_ids_batch = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();

            input_ids_batch.extend(ids.iter().map(|&id| id as i64));
            attention_mask_batch.extend(mask.iter().map(|&m| m as i64));
            token_type_ids_batch.extend(std::iter::repeat(0i64).take(ids.len()));

            let padding_needed = max_len - ids.len();
            input_ids_batch.extend(std::iter::repeat(0i64).take(padding_needed));
            attention_mask_batch.extend(std::iter::repeat(0i64).take(padding_needed));
            token_type_ids_batch.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        // Keep a copy of the attention mask for mean pooling
        let attention_mask_for_pooling = attention_mask_batch.clone();

        let input_ids_array = Array2::from_shape_vec((texts.len(), max_len), input_ids_batch)
            .context("Failed to create batch input_ids array")?;
        let attention_mask_array =
            Array2::from_shape_vec((texts.len(), max_len), attention_mask_batch)
                .context("Failed to create batch attention_mask array")?;
        let token_type_ids_array =
            Array2::from_shape_vec((texts.len(), max_len), token_type_ids_batch)
                .context("Failed to create batch token_type_ids array")?;

        // Lock session for thread-safe access
        let mut session_guard = self.session.lock().unwrap();
        let outputs = session_guard.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Model outputs token-level embeddings: [batch, seq_len, hidden_dim].
        // Apply mean pooling over the sequence dimension for each item.
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for batch_idx in 0..texts.len() {
            let batch_item = output_array.index_axis(Axis(0), batch_idx);
            let seq_len = batch_item.shape()[0];
            let hidden_dim = batch_item.shape()[1];

            let mask_start = batch_idx * max_len;
            let mask_end = mask_start + max_len;
            let item_mask = &attention_mask_for_pooling[mask_start..mask_end];

            // Mean pooling weighted by the attention mask so padding tokens
            // do not contribute
            let mut pooled = vec![0.0f32; hidden_dim];
            let mut sum_mask = 0.0f32;

            for i in 0..seq_len {
                let mask_value = item_mask[i] as f32;
                sum_mask += mask_value;
                for j in 0..hidden_dim {
                    pooled[j] += batch_item[[i, j]] * mask_value;
                }
            }

            for val in &mut pooled {
                *val /= sum_mask.max(1e-9);
            }

            embeddings.push(pooled);
        }

        for (i, emb) in embeddings.iter().enumerate() {
            if emb.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    emb.len(),
                    self.dimension
                );
            }
        }

        Ok(embeddings)
    }

    /// Returns the output dimension of this model
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl TextEmbedder for OnnxEmbeddingModel {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        OnnxEmbeddingModel::embed_batch(self, texts).await
    }
}
