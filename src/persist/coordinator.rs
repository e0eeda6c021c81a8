use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::db::{DocStore, StoreError};
use crate::models::{SaveErrorMessage, SavedMessage, ServerMessage};

/// One not-yet-fired write intention.
struct PendingWrite {
    seq: u64,
    task: JoinHandle<()>,
}

/// Debounces writes per document id and serves the load-on-join snapshot.
///
/// At most one write intention is pending per document id: each new edit
/// aborts and replaces the previous deferred task, so a burst of edits
/// within the delay window produces a single upsert holding the last
/// value. A cancelled timer's content is discarded entirely.
pub struct PersistenceCoordinator {
    store: Arc<dyn DocStore>,
    delay: Duration,
    seq: AtomicU64,
    pending: Arc<Mutex<HashMap<String, PendingWrite>>>,
}

impl PersistenceCoordinator {
    pub fn new(store: Arc<dyn DocStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            seq: AtomicU64::new(0),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load the last persisted snapshot for a joining session.
    ///
    /// A document with no prior upsert reads as empty; nothing is written.
    /// Unsaved in-flight edits of live peers are not reflected until their
    /// debounce timer fires.
    pub async fn load(&self, document_id: &str) -> Result<String, StoreError> {
        let document = self.store.get(document_id).await?;
        Ok(document.map(|d| d.content).unwrap_or_default())
    }

    /// Record `content` as the latest value for the document and (re)start
    /// its save timer.
    ///
    /// `notify` is the mailbox of the session that triggered this write;
    /// it alone receives the save outcome. A failed write is not retried
    /// on its own; the next edit is the retry.
    pub async fn schedule_save(
        &self,
        document_id: &str,
        content: String,
        notify: mpsc::UnboundedSender<ServerMessage>,
    ) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;

        // Hold the lock across abort-and-replace so the new task cannot
        // observe the map before its own slot is installed.
        let mut pending = self.pending.lock().await;

        let task = tokio::spawn({
            let store = self.store.clone();
            let pending = self.pending.clone();
            let delay = self.delay;
            let document_id = document_id.to_string();
            async move {
                tokio::time::sleep(delay).await;

                // Claim the slot. A newer edit may have replaced this task
                // between wake-up and lock acquisition; its content must
                // not be written in that case.
                {
                    let mut pending = pending.lock().await;
                    match pending.get(&document_id) {
                        Some(slot) if slot.seq == seq => {
                            pending.remove(&document_id);
                        }
                        _ => return,
                    }
                }

                match store.upsert(&document_id, &content).await {
                    Ok(saved) => {
                        debug!(
                            "Persisted document {} ({} bytes)",
                            document_id,
                            saved.content.len()
                        );
                        let _ = notify.send(ServerMessage::Saved(SavedMessage {
                            date: saved.updated_at.to_rfc3339(),
                        }));
                    }
                    Err(e) => {
                        error!("Failed to persist document {}: {}", document_id, e);
                        let _ = notify.send(ServerMessage::SaveError(SaveErrorMessage {
                            error: e.to_string(),
                        }));
                    }
                }
            }
        });

        if let Some(previous) = pending.insert(document_id.to_string(), PendingWrite { seq, task }) {
            previous.task.abort();
        }
    }

    /// Number of documents with a write currently pending.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemDocStore, StoredDocument};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{sleep, timeout};

    const DELAY: Duration = Duration::from_millis(50);

    /// Counts upserts so coalescing is observable.
    struct CountingStore {
        inner: MemDocStore,
        upserts: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemDocStore::new(),
                upserts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocStore for CountingStore {
        async fn get(&self, document_id: &str) -> Result<Option<StoredDocument>, StoreError> {
            self.inner.get(document_id).await
        }

        async fn upsert(
            &self,
            document_id: &str,
            content: &str,
        ) -> Result<StoredDocument, StoreError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            self.inner.upsert(document_id, content).await
        }
    }

    /// Fails the first `failures` writes, then delegates; reads succeed.
    struct FlakyStore {
        inner: MemDocStore,
        failures: AtomicUsize,
    }

    impl FlakyStore {
        fn new(failures: usize) -> Self {
            Self {
                inner: MemDocStore::new(),
                failures: AtomicUsize::new(failures),
            }
        }
    }

    #[async_trait]
    impl DocStore for FlakyStore {
        async fn get(&self, document_id: &str) -> Result<Option<StoredDocument>, StoreError> {
            self.inner.get(document_id).await
        }

        async fn upsert(
            &self,
            document_id: &str,
            content: &str,
        ) -> Result<StoredDocument, StoreError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    (left > 0).then(|| left - 1)
                })
                .is_ok()
            {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.upsert(document_id, content).await
        }
    }

    #[tokio::test]
    async fn load_of_unknown_document_is_empty() {
        let coordinator = PersistenceCoordinator::new(Arc::new(MemDocStore::new()), DELAY);
        assert_eq!(coordinator.load("doc1").await.unwrap(), "");
    }

    #[tokio::test]
    async fn burst_of_edits_produces_one_write_with_last_value() {
        let store = Arc::new(CountingStore::new());
        let coordinator = PersistenceCoordinator::new(store.clone(), DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        coordinator.schedule_save("doc1", "a".to_string(), tx.clone()).await;
        coordinator.schedule_save("doc1", "ab".to_string(), tx.clone()).await;
        coordinator.schedule_save("doc1", "abc".to_string(), tx.clone()).await;
        assert_eq!(coordinator.pending_count().await, 1);

        sleep(DELAY * 4).await;

        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("doc1").await.unwrap().unwrap().content, "abc");
        assert_eq!(coordinator.pending_count().await, 0);

        match rx.recv().await {
            Some(ServerMessage::Saved(_)) => {}
            other => panic!("Expected saved notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn documents_debounce_independently() {
        let store = Arc::new(CountingStore::new());
        let coordinator = PersistenceCoordinator::new(store.clone(), DELAY);
        let (tx, _rx) = mpsc::unbounded_channel();

        coordinator.schedule_save("doc1", "one".to_string(), tx.clone()).await;
        coordinator.schedule_save("doc2", "two".to_string(), tx.clone()).await;
        assert_eq!(coordinator.pending_count().await, 2);

        sleep(DELAY * 4).await;

        assert_eq!(store.upserts.load(Ordering::SeqCst), 2);
        assert_eq!(store.get("doc1").await.unwrap().unwrap().content, "one");
        assert_eq!(store.get("doc2").await.unwrap().unwrap().content, "two");
    }

    #[tokio::test]
    async fn failed_write_notifies_and_does_not_reschedule() {
        let coordinator = PersistenceCoordinator::new(Arc::new(FlakyStore::new(usize::MAX)), DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        coordinator.schedule_save("doc1", "lost".to_string(), tx.clone()).await;
        sleep(DELAY * 4).await;

        match rx.recv().await {
            Some(ServerMessage::SaveError(msg)) => assert!(msg.error.contains("disk full")),
            other => panic!("Expected save error notification, got {other:?}"),
        }
        assert_eq!(coordinator.pending_count().await, 0);

        // No background retry: nothing further arrives without a new edit.
        assert!(timeout(DELAY * 4, rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn next_edit_after_a_failure_is_the_retry() {
        let store = Arc::new(FlakyStore::new(1));
        let coordinator = PersistenceCoordinator::new(store.clone(), DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        coordinator.schedule_save("doc1", "first".to_string(), tx.clone()).await;
        sleep(DELAY * 4).await;
        match rx.recv().await {
            Some(ServerMessage::SaveError(_)) => {}
            other => panic!("Expected save error notification, got {other:?}"),
        }
        assert!(store.get("doc1").await.unwrap().is_none());

        coordinator.schedule_save("doc1", "second".to_string(), tx).await;
        sleep(DELAY * 4).await;
        match rx.recv().await {
            Some(ServerMessage::Saved(_)) => {}
            other => panic!("Expected saved notification, got {other:?}"),
        }
        assert_eq!(store.get("doc1").await.unwrap().unwrap().content, "second");
    }
}
