//! End-to-end engine tests: writer + search over the in-memory store with a
//! deterministic stub embedder.

mod common;

use std::sync::Arc;

use codesearch::config::IndexConfig;
use codesearch::embedding::Embedder;
use codesearch::index::IndexWriter;
use codesearch::models::{CodeDocument, SnippetMeta};
use codesearch::search::SearchEngine;
use codesearch::store::memory::InMemoryVectorStore;

use common::{FlakyStore, StubEmbedder};

fn doc(file_path: &str, code: &str) -> CodeDocument {
    CodeDocument {
        document: code.to_string(),
        metadata: SnippetMeta {
            file_path: file_path.to_string(),
            start_line: 1,
            end_line: 1,
            fingerprint: String::new(),
            context: String::new(),
        },
    }
}

fn harness() -> (Arc<InMemoryVectorStore>, IndexWriter, SearchEngine) {
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(StubEmbedder)));
    let writer = IndexWriter::new(store.clone(), &IndexConfig::default());
    let engine = SearchEngine::new(store.clone());
    (store, writer, engine)
}

#[tokio::test]
async fn test_upsert_then_search_finds_snippet() {
    let (_store, writer, engine) = harness();

    writer
        .upsert(vec![doc("a.py", "def f(): pass")])
        .await
        .unwrap();

    let hits = engine.search("def f", 5, 0.0, None, None).await.unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].file_path, "a.py");
    assert_eq!(hits[0].code, "def f(): pass");
}

#[tokio::test]
async fn test_upsert_replaces_prior_generation() {
    let (store, writer, engine) = harness();

    writer
        .upsert(vec![
            doc("a.py", "def old_handler(request): pass"),
            doc("a.py", "def old_helper(): pass"),
        ])
        .await
        .unwrap();
    assert_eq!(store.len(), 2);

    writer
        .upsert(vec![doc("a.py", "def new_handler(request): pass")])
        .await
        .unwrap();
    assert_eq!(store.len(), 1);

    // Nothing from the first generation survives, even when searching for
    // its exact content with no filters.
    let hits = engine
        .search("def old_handler", 10, 0.0, Some(""), None)
        .await
        .unwrap();
    for hit in &hits {
        assert!(!hit.code.contains("old_"), "stale document returned: {}", hit.code);
    }
}

#[tokio::test]
async fn test_delete_is_scoped_per_path() {
    let (store, writer, engine) = harness();

    writer
        .upsert(vec![
            doc("a.py", "def alpha(): pass"),
            doc("b.py", "def beta(): pass"),
        ])
        .await
        .unwrap();

    writer
        .upsert(vec![doc("a.py", "def alpha_v2(): pass")])
        .await
        .unwrap();

    // b.py still has its document.
    assert_eq!(store.len(), 2);
    let hits = engine
        .search("def beta", 10, 0.0, None, Some("*.py"))
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.file_path == "b.py"));
}

#[tokio::test]
async fn test_upsert_idempotent_for_same_path_set() {
    let (store, writer, _engine) = harness();

    let batch = vec![
        doc("a.py", "def f(): pass"),
        doc("a.py", "def g(): pass"),
        doc("b.py", "def h(): pass"),
    ];

    writer.upsert(batch.clone()).await.unwrap();
    writer.upsert(batch).await.unwrap();

    // Same observable state as a single submission.
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_upsert_chunked_writes_match_bulk_result() {
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(StubEmbedder)));
    let writer = IndexWriter::new(
        store.clone(),
        &IndexConfig {
            write_batch_size: 2,
            max_document_chars: 0,
        },
    );

    let batch: Vec<CodeDocument> = (0..5)
        .map(|i| doc(&format!("f{i}.py"), &format!("def fn_{i}(): pass")))
        .collect();
    let receipt = writer.upsert(batch).await.unwrap();

    assert_eq!(receipt.documents, 5);
    assert_eq!(receipt.files, 5);
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_document_text_truncated_to_cap() {
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(StubEmbedder)));
    let writer = IndexWriter::new(
        store.clone(),
        &IndexConfig {
            write_batch_size: 50,
            max_document_chars: 10,
        },
    );
    let engine = SearchEngine::new(store);

    writer
        .upsert(vec![doc("a.py", "def f(): pass  # trailing explanation")])
        .await
        .unwrap();

    let hits = engine.search("def f", 5, 0.0, None, None).await.unwrap();
    assert_eq!(hits[0].code, "def f(): p");
}

#[tokio::test]
async fn test_search_respects_cap_threshold_and_ordering() {
    let (_store, writer, engine) = harness();

    writer
        .upsert(vec![
            doc("a.py", "def parse_config(path): pass"),
            doc("b.py", "def parse_args(argv): pass"),
            doc("c.py", "class TreeWalker: pass"),
            doc("d.py", "def parse_config(path): return load(path)"),
        ])
        .await
        .unwrap();

    let hits = engine
        .search("def parse_config", 2, 0.1, None, None)
        .await
        .unwrap();

    assert!(hits.len() <= 2);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for hit in &hits {
        assert!(hit.score >= 0.1);
    }
}

#[tokio::test]
async fn test_search_filters_by_path_patterns() {
    let (_store, writer, engine) = harness();

    writer
        .upsert(vec![
            doc("src/app.py", "def render(): pass"),
            doc("src/app.rs", "fn render() {}"),
            doc("docs/render.md", "render pipeline notes"),
        ])
        .await
        .unwrap();

    let hits = engine
        .search("render", 10, 0.0, Some("*.md"), None)
        .await
        .unwrap();
    assert!(hits.iter().all(|h| !h.file_path.ends_with(".md")));

    let hits = engine
        .search("render", 10, 0.0, None, Some("*.{py,md}"))
        .await
        .unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| !h.file_path.ends_with(".rs")));
}

#[tokio::test]
async fn test_embed_batch_preserves_input_order() {
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let batch = StubEmbedder.embed(&texts).await.unwrap();

    for (text, vector) in texts.iter().zip(&batch) {
        let single = StubEmbedder.embed(&[text.clone()]).await.unwrap();
        assert_eq!(vector, &single[0], "vector for {text:?} out of order");
    }
}

#[tokio::test]
async fn test_failed_insert_surfaces_and_retry_converges() {
    let store = FlakyStore::failing_once_on(
        InMemoryVectorStore::new(Arc::new(StubEmbedder)),
        // With batch size 1, the second add call fails.
        2,
    );
    let writer = IndexWriter::new(
        store.clone(),
        &IndexConfig {
            write_batch_size: 1,
            max_document_chars: 0,
        },
    );

    let batch = vec![
        doc("a.py", "def f(): pass"),
        doc("a.py", "def g(): pass"),
        doc("a.py", "def h(): pass"),
    ];

    // First chunk commits, second fails; the upsert reports the error.
    let err = writer.upsert(batch.clone()).await.unwrap_err();
    assert!(err.to_string().contains("insert"));

    // Retrying the same path set replaces the partial generation cleanly.
    let receipt = writer.upsert(batch).await.unwrap();
    assert_eq!(receipt.documents, 3);

    let engine = SearchEngine::new(store);
    let hits = engine.search("def", 10, 0.0, None, None).await.unwrap();
    assert_eq!(hits.len(), 3);
}
