// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Relevance ranking via sentence-embedding cosine similarity
//!
//! Embeds the research query and the lead of each candidate's content, then
//! selects the candidate with the highest cosine similarity. Ranking is a
//! best-effort stage: any embedding failure falls back to the first candidate
//! in extraction order instead of aborting the workflow.

use tracing::{info, warn};

use crate::content::Candidate;
use crate::embeddings::TextEmbedder;

/// Only the lead of long content is embedded; this bounds embedding cost and
/// is an accepted lossy approximation.
pub const CONTENT_EMBED_CHARS: usize = 1000;

/// A fixed-dimension embedding vector.
#[derive(Debug, Clone)]
pub struct Embedding {
    data: Vec<f32>,
    dimension: usize,
}

impl Embedding {
    pub fn new(data: Vec<f32>) -> Self {
        let dimension = data.len();
        Self { data, dimension }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn magnitude(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.dimension != other.dimension {
            return 0.0;
        }

        let dot_product: f32 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum();

        let magnitude_self = self.magnitude();
        let magnitude_other = other.magnitude();

        if magnitude_self == 0.0 || magnitude_other == 0.0 {
            0.0
        } else {
            dot_product / (magnitude_self * magnitude_other)
        }
    }
}

/// Select the candidate most semantically relevant to `query`.
///
/// Returns `None` only for an empty candidate list. The returned candidate is
/// always a member of the input; ties on the similarity score go to the
/// earliest candidate.
///
/// On any embedding failure this logs a warning and returns the first
/// candidate unchanged - availability over precision, never aborting the
/// workflow over a ranking problem.
pub async fn rank_by_relevance(
    candidates: &[Candidate],
    query: &str,
    embedder: &dyn TextEmbedder,
) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }

    let mut inputs = Vec::with_capacity(candidates.len() + 1);
    inputs.push(query.to_string());
    for candidate in candidates {
        inputs.push(content_lead(&candidate.content));
    }

    let vectors = match embedder.embed_batch(&inputs).await {
        Ok(vectors) if vectors.len() == inputs.len() => vectors,
        Ok(vectors) => {
            warn!(
                "Ranking skipped (embedding count mismatch: {} != {}), returning first candidate",
                vectors.len(),
                inputs.len()
            );
            return candidates.first().cloned();
        }
        Err(e) => {
            warn!("Ranking skipped ({}), returning first candidate", e);
            return candidates.first().cloned();
        }
    };

    let query_embedding = Embedding::new(vectors[0].clone());

    let mut best_idx = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (idx, vector) in vectors[1..].iter().enumerate() {
        let score = query_embedding.cosine_similarity(&Embedding::new(vector.clone()));
        if score > best_score {
            best_score = score;
            best_idx = idx;
        }
    }

    info!(
        "Best match: '{}' with score {:.4}",
        candidates[best_idx].title, best_score
    );

    Some(candidates[best_idx].clone())
}

/// First `CONTENT_EMBED_CHARS` characters of the content.
fn content_lead(content: &str) -> String {
    content.chars().take(CONTENT_EMBED_CHARS).collect()
}
