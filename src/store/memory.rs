//! In-memory [`VectorStore`] backed by a brute-force cosine scan.
//!
//! Entries live in a `Vec` behind `std::sync::RwLock`. Embeddings are
//! produced through the injected [`Embedder`] on both the write and the
//! query path. Suitable for tests and single-process serving.

use std::sync::{Arc, RwLock};

use anyhow::{ensure, Result};
use async_trait::async_trait;

use crate::embedding::{embed_one, Embedder};
use crate::models::SnippetMeta;

use super::{Neighbor, VectorStore};

struct StoredEntry {
    _id: String,
    document: String,
    metadata: SnippetMeta,
    vector: Vec<f32>,
}

/// Brute-force in-memory store.
pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<StoredEntry>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

/// Cosine distance `1 - cos(a, b)`, ranging over `[0, 2]`.
///
/// Degenerate vectors (empty, mismatched lengths, zero magnitude) are
/// treated as orthogonal, i.e. distance `1.0`.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[SnippetMeta],
    ) -> Result<()> {
        ensure!(
            ids.len() == documents.len() && documents.len() == metadatas.len(),
            "ids, documents, and metadatas must be parallel (got {}/{}/{})",
            ids.len(),
            documents.len(),
            metadatas.len()
        );
        if documents.is_empty() {
            return Ok(());
        }

        let vectors = self.embedder.embed(documents).await?;

        let mut entries = self.entries.write().unwrap();
        for ((id, document), (metadata, vector)) in ids
            .iter()
            .zip(documents)
            .zip(metadatas.iter().zip(vectors))
        {
            entries.push(StoredEntry {
                _id: id.clone(),
                document: document.clone(),
                metadata: metadata.clone(),
                vector,
            });
        }
        Ok(())
    }

    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64> {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|entry| entry.metadata.file_path != file_path);
        Ok((before - entries.len()) as u64)
    }

    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<Neighbor>> {
        let query_vec = embed_one(self.embedder.as_ref(), query_text).await?;

        let entries = self.entries.read().unwrap();
        let mut neighbors: Vec<Neighbor> = entries
            .iter()
            .map(|entry| Neighbor {
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                distance: cosine_distance(&query_vec, &entry.vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(n_results);
        Ok(neighbors)
    }
}
