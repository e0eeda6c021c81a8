use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::{DocStore, StoreError, StoredDocument};

/// In-memory document store.
///
/// Used when no database URL is configured, and by tests. Documents live
/// for the lifetime of the process.
#[derive(Default)]
pub struct MemDocStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl MemDocStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocStore for MemDocStore {
    async fn get(&self, document_id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.documents.read().await.get(document_id).cloned())
    }

    async fn upsert(&self, document_id: &str, content: &str) -> Result<StoredDocument, StoreError> {
        let mut documents = self.documents.write().await;
        let now = Utc::now();
        let document = documents
            .entry(document_id.to_string())
            .and_modify(|document| {
                document.content = content.to_string();
                document.updated_at = now;
            })
            .or_insert_with(|| StoredDocument {
                id: document_id.to_string(),
                content: content.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(document.clone())
    }
}
