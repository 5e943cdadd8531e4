use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::ids::UserId;
use crate::domain::store::{Document, DocumentStore, LiveQuery};

use super::spawn_live_query;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-process document store. Backs tests and ephemeral runs; the live
/// query machinery is identical to the durable store's.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    collections: Mutex<Collections>,
    revision: watch::Sender<u64>,
}

impl Default for Inner {
    fn default() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            collections: Mutex::new(HashMap::new()),
            revision,
        }
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.inner
            .collections
            .lock()
            .map_err(|_| StoreError::unexpected("store mutex poisoned"))
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .is_some_and(|docs| docs.contains_key(key)))
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|data| Document {
                key: key.to_string(),
                data: data.clone(),
            }))
    }

    async fn write(&self, collection: &str, key: &str, payload: Value) -> Result<(), StoreError> {
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), payload);
        self.bump();
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let removed = self
            .lock()?
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .is_some();
        if removed {
            self.bump();
        }
        Ok(())
    }

    async fn add(&self, collection: &str, payload: Value) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        self.write(collection, &key, payload).await?;
        Ok(key)
    }

    async fn query_by_user(
        &self,
        collection: &str,
        uid: &UserId,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| {
                        data.get("uid").and_then(Value::as_str) == Some(uid.as_str())
                    })
                    .map(|(key, data)| Document {
                        key: key.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, data)| Document {
                        key: key.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery {
        spawn_live_query(
            self.clone(),
            self.inner.revision.subscribe(),
            collection.to_string(),
            uid.clone(),
        )
    }
}
