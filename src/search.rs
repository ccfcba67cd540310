//! Similarity search with score normalization and path filtering.
//!
//! The engine makes exactly one store round-trip per search: it overfetches
//! neighbors, converts distances to `[0, 1]` scores, applies the threshold
//! and path filters, and stops at the result cap. If filtering leaves fewer
//! than `max_results` survivors the smaller set is returned as-is —
//! approximate recall in exchange for the single round-trip.

use std::sync::Arc;

use tracing::debug;

use crate::error::SearchError;
use crate::models::SearchHit;
use crate::path_filter::PathFilter;
use crate::store::VectorStore;

/// Over-fetch multiplier applied to the neighbor query, compensating for
/// candidates discarded by the threshold and path filters without a second
/// round-trip.
const OVERFETCH_FACTOR: usize = 2;

/// Span of the store's distance metric: cosine distance ranges over
/// `[0, 2]`, so `score = 1 - distance / DISTANCE_SPAN` maps identical
/// vectors to 1 and maximally dissimilar vectors to 0. Substituting a store
/// with a different metric requires re-deriving this mapping.
const DISTANCE_SPAN: f32 = 2.0;

/// Answers similarity queries against the vector store.
pub struct SearchEngine {
    store: Arc<dyn VectorStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Run a similarity search.
    ///
    /// Returns at most `max_results` hits, every one with
    /// `score >= threshold`, ordered by descending score. `exclude` drops
    /// hits whose path matches any pattern in the comma-separated list;
    /// `include` keeps only hits matching at least one pattern, with an
    /// empty or unusable list meaning "keep everything". Candidates are
    /// accepted in the store's returned order and evaluation stops as soon
    /// as the cap is reached.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        threshold: f32,
        exclude: Option<&str>,
        include: Option<&str>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        let exclude = exclude
            .filter(|p| !p.trim().is_empty())
            .map(PathFilter::compile);
        let include = include
            .filter(|p| !p.trim().is_empty())
            .map(PathFilter::compile);

        let neighbors = self
            .store
            .query(query, max_results * OVERFETCH_FACTOR)
            .await
            .map_err(|cause| SearchError::Query { cause })?;
        let candidates = neighbors.len();

        let mut hits: Vec<SearchHit> = Vec::new();
        for neighbor in neighbors {
            if hits.len() == max_results {
                break;
            }

            let score = distance_to_score(neighbor.distance);
            if score < threshold {
                continue;
            }
            if let Some(ref filter) = exclude {
                if filter.matches(&neighbor.metadata.file_path) {
                    continue;
                }
            }
            if let Some(ref filter) = include {
                // A filter with no usable patterns keeps everything.
                if !filter.is_empty() && !filter.matches(&neighbor.metadata.file_path) {
                    continue;
                }
            }

            hits.push(SearchHit {
                code: neighbor.document,
                file_path: neighbor.metadata.file_path,
                line_start: neighbor.metadata.start_line,
                line_end: neighbor.metadata.end_line,
                fingerprint: neighbor.metadata.fingerprint,
                context: neighbor.metadata.context,
                score,
            });
        }

        debug!(query, candidates, hits = hits.len(), "search complete");
        Ok(hits)
    }
}

/// Map a store distance to a similarity score in `[0, 1]`.
fn distance_to_score(distance: f32) -> f32 {
    (1.0 - distance / DISTANCE_SPAN).clamp(0.0, 1.0)
}
