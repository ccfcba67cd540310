//! Index writer: per-file replace semantics over the vector store.
//!
//! An upsert is an explicit two-phase operation. Phase one clears every
//! distinct file path present in the batch; phase two inserts the new
//! generation in bounded chunks. The delete phase finishing before the first
//! insert is what makes a retried upsert idempotent for the same path set.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::models::{CodeDocument, IndexedDocument, SnippetMeta};
use crate::store::VectorStore;

/// Outcome of a successful upsert.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct UpsertReceipt {
    /// Documents inserted.
    pub documents: usize,
    /// Distinct file paths replaced.
    pub files: usize,
}

/// Writes snippet batches into the vector store, replacing per file path.
pub struct IndexWriter {
    store: Arc<dyn VectorStore>,
    write_batch_size: usize,
    max_document_chars: usize,
}

impl IndexWriter {
    pub fn new(store: Arc<dyn VectorStore>, config: &IndexConfig) -> Self {
        Self {
            store,
            write_batch_size: config.write_batch_size.max(1),
            max_document_chars: config.max_document_chars,
        }
    }

    /// Replace the indexed generation for every file path in `documents`.
    ///
    /// Deletes are scoped to exactly the paths in the batch and all complete
    /// before the first insert. Each document gets a fresh v4 UUID and its
    /// text is truncated to the configured cap. Inserts go out in chunks of
    /// `write_batch_size`; the chunking is a performance knob only — the end
    /// state equals one bulk insert.
    ///
    /// On failure, chunks inserted before the error remain committed: treat
    /// the index as possibly partial and retry with the same path set.
    /// Concurrent upserts touching the same path race (last insert wins);
    /// the index converges on one generation per path but this writer does
    /// not serialize them.
    pub async fn upsert(&self, documents: Vec<CodeDocument>) -> Result<UpsertReceipt, IndexError> {
        let paths: BTreeSet<String> = documents
            .iter()
            .map(|d| d.metadata.file_path.clone())
            .collect();

        // Phase one: clear every affected path.
        for path in &paths {
            let deleted = self
                .store
                .delete_by_file_path(path)
                .await
                .map_err(|cause| IndexError::Delete {
                    file_path: path.clone(),
                    cause,
                })?;
            debug!(file_path = %path, deleted, "cleared prior generation");
        }

        // Phase two: insert the new generation in bounded chunks.
        let prepared: Vec<IndexedDocument> = documents
            .into_iter()
            .map(|d| IndexedDocument {
                id: Uuid::new_v4().to_string(),
                document: truncate_chars(d.document, self.max_document_chars),
                metadata: d.metadata,
            })
            .collect();

        for chunk in prepared.chunks(self.write_batch_size) {
            let ids: Vec<String> = chunk.iter().map(|d| d.id.clone()).collect();
            let texts: Vec<String> = chunk.iter().map(|d| d.document.clone()).collect();
            let metas: Vec<SnippetMeta> = chunk.iter().map(|d| d.metadata.clone()).collect();

            self.store
                .add(&ids, &texts, &metas)
                .await
                .map_err(|cause| IndexError::Insert {
                    count: chunk.len(),
                    cause,
                })?;
        }

        Ok(UpsertReceipt {
            documents: prepared.len(),
            files: paths.len(),
        })
    }
}

/// Truncate to at most `max_chars` characters, on a char boundary.
/// A cap of zero disables truncation.
fn truncate_chars(text: String, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text;
    }
    text.chars().take(max_chars).collect()
}
