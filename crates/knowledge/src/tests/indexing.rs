//! Startup indexing against the SQLite store.

use super::support::KeywordEmbedder;
use crate::indexer::Indexer;
use crate::sqlite_store::SqliteVectorStore;
use crate::store::VectorStore;
use crate::types::IndexOutcome;
use fastrag_core::AppError;
use std::sync::Arc;
use tempfile::TempDir;

fn pages() -> Vec<String> {
    vec![
        "Capítulo 1. A igreja local.".to_string(),
        "   ".to_string(),
        "Capítulo 2. Batismo e profissão de fé.".to_string(),
        "Capítulo 3. Eleição de oficiais.".to_string(),
        "Capítulo 4. Tesouraria.".to_string(),
    ]
}

#[tokio::test]
async fn test_indexes_empty_store_with_sequential_ids() {
    let store = Arc::new(SqliteVectorStore::open_in_memory().unwrap());
    let embedder = Arc::new(KeywordEmbedder::new(vec![1.0, 0.0, 0.0]));
    let indexer = Indexer::new(store.clone(), embedder.clone(), 40).with_batch_size(2);

    let outcome = indexer.index_if_empty(&pages()).await.unwrap();

    let chunks = match outcome {
        IndexOutcome::Indexed { pages, chunks, .. } => {
            assert_eq!(pages, 5);
            chunks
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert!(chunks > 1);
    assert_eq!(store.count().unwrap(), chunks);
    assert_eq!(embedder.texts(), chunks);
    assert_eq!(embedder.batches(), chunks.div_ceil(2));

    for i in 0..chunks {
        let record = store.get(&i.to_string()).unwrap().unwrap();
        assert!(!record.metadata.content.is_empty());
        assert_eq!(record.embedding.len(), 3);
    }
    assert!(store.get(&chunks.to_string()).unwrap().is_none());
}

#[tokio::test]
async fn test_non_empty_store_is_left_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".fastrag/store.sqlite");

    {
        let store = Arc::new(SqliteVectorStore::open(&path).unwrap());
        let embedder = Arc::new(KeywordEmbedder::new(vec![1.0, 0.0, 0.0]));
        let indexer = Indexer::new(store, embedder, 40);
        indexer.index_if_empty(&pages()).await.unwrap();
    }

    // Restart against a different corpus: nothing is embedded or written
    let store = Arc::new(SqliteVectorStore::open(&path).unwrap());
    let before = store.count().unwrap();
    let first = store.get("0").unwrap();

    let embedder = Arc::new(KeywordEmbedder::new(vec![0.0, 1.0, 0.0]));
    let indexer = Indexer::new(store.clone(), embedder.clone(), 40);
    let outcome = indexer
        .index_if_empty(&["Um corpus completamente diferente."])
        .await
        .unwrap();

    assert_eq!(outcome, IndexOutcome::Skipped { existing: before });
    assert_eq!(embedder.batches(), 0);
    assert_eq!(store.count().unwrap(), before);
    assert_eq!(store.get("0").unwrap(), first);
}

#[tokio::test]
async fn test_embedding_failure_leaves_store_empty() {
    let store = Arc::new(SqliteVectorStore::open_in_memory().unwrap());
    let embedder = Arc::new(KeywordEmbedder::new(vec![1.0, 0.0]).failing_from(1));
    let indexer = Indexer::new(store.clone(), embedder, 10).with_batch_size(1);

    let result = indexer.index_if_empty(&pages()).await;

    assert!(matches!(result, Err(AppError::ExternalService { .. })));
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_empty_corpus_stores_nothing() {
    let store = Arc::new(SqliteVectorStore::open_in_memory().unwrap());
    let embedder = Arc::new(KeywordEmbedder::new(vec![1.0, 0.0]));
    let indexer = Indexer::new(store.clone(), embedder.clone(), 10);

    let pages: Vec<String> = Vec::new();
    let outcome = indexer.index_if_empty(&pages).await.unwrap();

    assert!(matches!(outcome, IndexOutcome::Indexed { chunks: 0, .. }));
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(embedder.batches(), 0);
}

#[tokio::test]
async fn test_dimension_change_on_existing_store_is_rejected() {
    let store = Arc::new(SqliteVectorStore::open_in_memory().unwrap());
    let indexer = Indexer::new(
        store.clone(),
        Arc::new(KeywordEmbedder::new(vec![1.0, 0.0, 0.0])),
        40,
    );
    indexer.index_if_empty(&pages()).await.unwrap();

    let resized = Indexer::new(store, Arc::new(KeywordEmbedder::new(vec![1.0, 0.0])), 40);
    let result = resized.index_if_empty(&pages()).await;
    assert!(matches!(result, Err(AppError::Config(_))));
}
