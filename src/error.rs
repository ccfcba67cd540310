//! Error taxonomy for the indexing and search pipeline.
//!
//! Provider and store failures propagate to the caller exactly once with the
//! original cause attached; nothing in the core retries. Filter-pattern
//! compile failures never appear here — [`crate::path_filter`] absorbs them
//! with a warning and degrades to a looser match.

use thiserror::Error;

/// An upstream embedding call failed.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport-level failure: connect, timeout, TLS.
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status (auth, quota, rate
    /// limit, malformed input).
    #[error("embedding provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed embedding response: {0}")]
    Malformed(String),

    /// No embedding provider is configured.
    #[error("embedding provider is disabled")]
    Disabled,
}

/// A vector-store write failed during an upsert.
///
/// Chunks committed before the failure remain committed. Resubmitting the
/// same file-path set is safe: deletes run before inserts, so a retry
/// converges on a single generation per path.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to clear prior entries for {file_path}: {cause}")]
    Delete {
        file_path: String,
        cause: anyhow::Error,
    },

    #[error("failed to insert batch of {count} documents: {cause}")]
    Insert { count: usize, cause: anyhow::Error },
}

/// A vector-store query failed during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("vector store query failed: {cause}")]
    Query { cause: anyhow::Error },
}
