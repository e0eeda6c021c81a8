//! REST surface tests, exercising the handlers directly against an
//! in-memory store.

use axum::extract::{Path, State};
use axum::Json;
use cowrite_doc::db::MemDocStore;
use cowrite_doc::handlers::{fetch_document, save_document};
use cowrite_doc::models::SaveDocumentRequest;
use cowrite_doc::AppState;
use std::sync::Arc;
use std::time::Duration;

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(MemDocStore::new()),
        Duration::from_millis(200),
    ))
}

#[tokio::test]
async fn fetch_creates_missing_documents_empty() {
    let state = test_state();

    let (_, Json(document)) = fetch_document(State(state.clone()), Path("doc1".to_string()))
        .await
        .expect("fetch should succeed");

    assert_eq!(document.id, "doc1");
    assert_eq!(document.content, "");
    assert_eq!(document.created_at, document.updated_at);

    // The created row is durable: a second fetch returns the same document.
    let (_, Json(again)) = fetch_document(State(state), Path("doc1".to_string()))
        .await
        .expect("fetch should succeed");
    assert_eq!(again.created_at, document.created_at);
}

#[tokio::test]
async fn save_upserts_and_returns_the_document() {
    let state = test_state();

    let (_, Json(saved)) = save_document(
        State(state.clone()),
        Path("doc1".to_string()),
        Json(SaveDocumentRequest {
            content: "Hello".to_string(),
        }),
    )
    .await
    .expect("save should succeed");
    assert_eq!(saved.content, "Hello");

    let (_, Json(replaced)) = save_document(
        State(state.clone()),
        Path("doc1".to_string()),
        Json(SaveDocumentRequest {
            content: "Hello, world".to_string(),
        }),
    )
    .await
    .expect("save should succeed");

    // Content is fully replaced, never merged.
    assert_eq!(replaced.content, "Hello, world");
    assert_eq!(replaced.created_at, saved.created_at);
    assert!(replaced.updated_at >= saved.updated_at);

    let (_, Json(fetched)) = fetch_document(State(state), Path("doc1".to_string()))
        .await
        .expect("fetch should succeed");
    assert_eq!(fetched.content, "Hello, world");
}
