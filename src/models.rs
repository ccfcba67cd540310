//! Core data types flowing through the indexing and search pipeline.

use serde::{Deserialize, Serialize};

/// Metadata attached to every indexed snippet.
///
/// `file_path` is the replace key: all documents sharing a path form one
/// generation that is swapped out as a unit on re-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetMeta {
    pub file_path: String,
    pub start_line: i64,
    pub end_line: i64,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub context: String,
}

/// A snippet submitted for indexing, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeDocument {
    pub document: String,
    pub metadata: SnippetMeta,
}

/// A snippet as held by the index.
///
/// Created by the writer with a fresh id; never mutated in place — updates
/// are delete-then-insert keyed by `metadata.file_path`.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: String,
    pub document: String,
    pub metadata: SnippetMeta,
}

/// A ranked search hit.
///
/// `score` is in `[0, 1]`, higher = more similar. Embedding vectors are
/// write-side only and never appear in results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub code: String,
    pub file_path: String,
    pub line_start: i64,
    pub line_end: i64,
    pub fingerprint: String,
    pub context: String,
    pub score: f32,
}
