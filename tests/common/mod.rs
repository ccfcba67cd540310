//! Shared test doubles for the integration suites.
#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use codesearch::embedding::Embedder;
use codesearch::error::EmbeddingError;
use codesearch::models::SnippetMeta;
use codesearch::store::{Neighbor, VectorStore};

pub const STUB_DIMS: usize = 64;

/// Deterministic embedder: each whitespace token adds weight to a hashed
/// bucket, so cosine similarity tracks token overlap. Enough to make
/// `"def f"` land nearest to `"def f(): pass"` without a model.
pub struct StubEmbedder;

pub fn stub_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; STUB_DIMS];
    for token in text.split_whitespace() {
        let token = token.to_lowercase();
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        vector[(hasher.finish() % STUB_DIMS as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| stub_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "stub"
    }

    fn dims(&self) -> usize {
        STUB_DIMS
    }
}

/// Store wrapper that fails selected `add` calls once, then delegates.
///
/// Exercises the possibly-partial failure contract: chunks committed before
/// the failing call stay committed, and a retry with the same path set
/// converges on one generation.
pub struct FlakyStore<S> {
    inner: S,
    adds_seen: AtomicUsize,
    fail_on_add: usize,
}

impl<S> FlakyStore<S> {
    /// Fail the `fail_on_add`-th `add` call (1-based); later calls succeed.
    pub fn failing_once_on(inner: S, fail_on_add: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            adds_seen: AtomicUsize::new(0),
            fail_on_add,
        })
    }
}

#[async_trait]
impl<S: VectorStore> VectorStore for FlakyStore<S> {
    async fn add(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[SnippetMeta],
    ) -> Result<()> {
        let seen = self.adds_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if seen == self.fail_on_add {
            bail!("injected add failure");
        }
        self.inner.add(ids, documents, metadatas).await
    }

    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64> {
        self.inner.delete_by_file_path(file_path).await
    }

    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<Neighbor>> {
        self.inner.query(query_text, n_results).await
    }
}
