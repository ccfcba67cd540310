//! Vector-store capability consumed by the index writer and search engine.
//!
//! The store owns embedding production for the documents it holds: [`add`]
//! and [`query`] take raw text and talk to the [`Embedder`] themselves. The
//! engine never sees a vector — distances come back already computed.
//!
//! Distances returned by [`query`] are cosine distances in `[0, 2]`,
//! ascending (smaller = closer). The search engine's score mapping is pinned
//! to that range; a backend with a different metric must not implement this
//! trait without re-deriving the mapping.
//!
//! [`add`]: VectorStore::add
//! [`query`]: VectorStore::query
//! [`Embedder`]: crate::embedding::Embedder

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::SnippetMeta;

/// A nearest-neighbor hit returned from [`VectorStore::query`].
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub document: String,
    pub metadata: SnippetMeta,
    /// Cosine distance in `[0, 2]`; smaller = closer.
    pub distance: f32,
}

/// Abstract vector storage backend.
///
/// Implementations must be `Send + Sync`: one handle is shared across all
/// in-flight requests.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add`](VectorStore::add) | Embed and store documents under caller-assigned ids |
/// | [`delete_by_file_path`](VectorStore::delete_by_file_path) | Drop every entry whose metadata path matches exactly |
/// | [`query`](VectorStore::query) | Return the nearest neighbors for a query text |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed `documents` and store them. The three slices are parallel:
    /// `ids[i]` and `metadatas[i]` belong to `documents[i]`.
    async fn add(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[SnippetMeta],
    ) -> Result<()>;

    /// Delete all entries whose `metadata.file_path` equals `file_path`,
    /// returning how many were removed. Exact match only — entries for
    /// other paths are never touched.
    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64>;

    /// Return up to `n_results` nearest neighbors for `query_text`, sorted
    /// by ascending distance.
    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<Neighbor>>;
}
