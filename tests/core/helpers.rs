use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use shelfmark::domain::errors::StoreError;
use shelfmark::domain::ids::UserId;
use shelfmark::domain::markers::MarkerEntry;
use shelfmark::domain::session::Identity;
use shelfmark::domain::store::{Document, DocumentStore, LiveQuery};
use shelfmark::infrastructure::store::MemoryDocumentStore;
use tokio::sync::watch;

pub fn identity(uid: &str) -> Identity {
    Identity {
        uid: UserId::from(uid),
        email: format!("{uid}@example.com"),
    }
}

pub fn marker_payload(uid: &str, book_id: &str, title: &str, millis: i64) -> Value {
    json!({
        "uid": uid,
        "bookId": book_id,
        "bookTitle": title,
        "timestamp": millis,
    })
}

pub fn search_payload(uid: &str, keyword: &str, millis: i64) -> Value {
    json!({
        "uid": uid,
        "keyword": keyword,
        "timestamp": millis,
    })
}

/// Block until a snapshot matching the predicate is published, or fail
/// after five seconds.
pub async fn wait_for_snapshot<F>(
    rx: &mut watch::Receiver<Vec<MarkerEntry>>,
    predicate: F,
) -> Vec<MarkerEntry>
where
    F: Fn(&[MarkerEntry]) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if predicate(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    })
    .await
    .expect("timed out waiting for matching snapshot")
}

/// Block until the live query delivers a matching snapshot, or fail after
/// five seconds.
pub async fn next_matching<F>(live: &mut LiveQuery, predicate: F) -> Vec<Document>
where
    F: Fn(&[Document]) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match live.next().await {
                Some(Ok(documents)) if predicate(&documents) => return documents,
                Some(Ok(_)) => {}
                Some(Err(err)) => panic!("live query errored: {err}"),
                None => panic!("live query ended before delivering a match"),
            }
        }
    })
    .await
    .expect("timed out waiting for live query snapshot")
}

/// Memory store wrapper that counts every operation it receives.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    operations: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        self.tick();
        self.inner.exists(collection, key).await
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.tick();
        self.inner.get(collection, key).await
    }

    async fn write(&self, collection: &str, key: &str, payload: Value) -> Result<(), StoreError> {
        self.tick();
        self.inner.write(collection, key, payload).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.tick();
        self.inner.delete(collection, key).await
    }

    async fn add(&self, collection: &str, payload: Value) -> Result<String, StoreError> {
        self.tick();
        self.inner.add(collection, payload).await
    }

    async fn query_by_user(
        &self,
        collection: &str,
        uid: &UserId,
    ) -> Result<Vec<Document>, StoreError> {
        self.tick();
        self.inner.query_by_user(collection, uid).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.tick();
        self.inner.list(collection).await
    }

    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery {
        self.tick();
        self.inner.watch_by_user(collection, uid)
    }
}

/// Memory store wrapper that fails deletes for selected keys.
#[derive(Clone, Default)]
pub struct FailingDeleteStore {
    inner: MemoryDocumentStore,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FailingDeleteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.failing
            .lock()
            .expect("failing key set poisoned")
            .insert(key.to_string());
    }
}

#[async_trait]
impl DocumentStore for FailingDeleteStore {
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(collection, key).await
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn write(&self, collection: &str, key: &str, payload: Value) -> Result<(), StoreError> {
        self.inner.write(collection, key, payload).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let failing = self
            .failing
            .lock()
            .expect("failing key set poisoned")
            .contains(key);
        if failing {
            return Err(StoreError::unexpected("simulated delete failure"));
        }
        self.inner.delete(collection, key).await
    }

    async fn add(&self, collection: &str, payload: Value) -> Result<String, StoreError> {
        self.inner.add(collection, payload).await
    }

    async fn query_by_user(
        &self,
        collection: &str,
        uid: &UserId,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_by_user(collection, uid).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery {
        self.inner.watch_by_user(collection, uid)
    }
}

/// Store whose every operation fails, for error propagation tests.
#[derive(Clone, Default)]
pub struct BrokenStore {
    // Only used to satisfy `watch_by_user`; no test exercises it.
    inner: MemoryDocumentStore,
}

impl BrokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::unexpected("store offline"))
    }
}

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn exists(&self, _collection: &str, _key: &str) -> Result<bool, StoreError> {
        Self::offline()
    }

    async fn get(&self, _collection: &str, _key: &str) -> Result<Option<Document>, StoreError> {
        Self::offline()
    }

    async fn write(
        &self,
        _collection: &str,
        _key: &str,
        _payload: Value,
    ) -> Result<(), StoreError> {
        Self::offline()
    }

    async fn delete(&self, _collection: &str, _key: &str) -> Result<(), StoreError> {
        Self::offline()
    }

    async fn add(&self, _collection: &str, _payload: Value) -> Result<String, StoreError> {
        Self::offline()
    }

    async fn query_by_user(
        &self,
        _collection: &str,
        _uid: &UserId,
    ) -> Result<Vec<Document>, StoreError> {
        Self::offline()
    }

    async fn list(&self, _collection: &str) -> Result<Vec<Document>, StoreError> {
        Self::offline()
    }

    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery {
        self.inner.watch_by_user(collection, uid)
    }
}
