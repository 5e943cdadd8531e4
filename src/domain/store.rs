use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use super::errors::StoreError;
use super::ids::UserId;

/// A stored document: its key within the collection plus the raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub data: Value,
}

pub type SnapshotResult = Result<Vec<Document>, StoreError>;

/// Handle to a server-push query. Every delivery is the full result set,
/// never a delta; consumers replace their previous state wholesale.
///
/// Dropping the handle unsubscribes. Unsubscribing stops further delivery
/// but never cancels writes already in flight.
pub struct LiveQuery {
    rx: mpsc::Receiver<SnapshotResult>,
}

impl LiveQuery {
    /// Wrap a snapshot channel. Store implementations deliver full result
    /// sets into the sending half.
    pub fn new(rx: mpsc::Receiver<SnapshotResult>) -> Self {
        Self { rx }
    }

    /// Wait for the next snapshot. `None` means the stream has ended,
    /// either because the store went away or because an errored snapshot
    /// was already delivered.
    pub async fn next(&mut self) -> Option<SnapshotResult> {
        self.rx.recv().await
    }

    /// Stop delivery. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

/// Seam to the hosted document database.
///
/// Collections are flat maps of string key to JSON payload. User-scoped
/// queries match a top-level `uid` field in the payload. A single write or
/// delete is atomic at document granularity; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Keyed point existence check.
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Write the full payload under the given key, replacing any previous
    /// document. Either the whole payload lands or nothing does.
    async fn write(&self, collection: &str, key: &str, payload: Value) -> Result<(), StoreError>;

    /// Physically remove a document. Removing an absent key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Insert with a store-assigned key, which is returned to the caller.
    async fn add(&self, collection: &str, payload: Value) -> Result<String, StoreError>;

    /// All documents in `collection` whose payload `uid` matches.
    async fn query_by_user(
        &self,
        collection: &str,
        uid: &UserId,
    ) -> Result<Vec<Document>, StoreError>;

    /// Full collection scan. Used by the account layer's email lookup.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Open a server-push query scoped to `uid`. The initial snapshot is
    /// delivered immediately; every subsequent store change delivers the
    /// full result set again.
    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery;
}
