use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::warn;

use crate::domain::errors::StoreError;
use crate::domain::ids::UserId;
use crate::domain::searches::{
    RECENT_SEARCHES_COLLECTION, RecentSearch, RecentSearchRecord, partition_newest,
};
use crate::domain::session::Identity;
use crate::domain::store::DocumentStore;

/// Result of a record request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Saved under the store-assigned id.
    Saved(String),
    /// No identity or a blank keyword; nothing was stored.
    Skipped,
}

/// Records search keywords and trims a user's history on every load.
#[derive(Clone)]
pub struct RecentSearchService {
    store: Arc<dyn DocumentStore>,
}

impl RecentSearchService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Save a keyword against the user's history. Skipped silently when
    /// there is no identity or the keyword is blank.
    pub async fn record(
        &self,
        identity: Option<&Identity>,
        keyword: &str,
    ) -> Result<RecordOutcome, StoreError> {
        let Some(identity) = identity else {
            return Ok(RecordOutcome::Skipped);
        };
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(RecordOutcome::Skipped);
        }

        let record = RecentSearchRecord {
            uid: identity.uid.clone(),
            keyword: keyword.to_string(),
            timestamp: Utc::now(),
        };
        let payload =
            serde_json::to_value(&record).map_err(|err| StoreError::unexpected(err.to_string()))?;
        let id = self.store.add(RECENT_SEARCHES_COLLECTION, payload).await?;
        Ok(RecordOutcome::Saved(id))
    }

    /// Load the user's history newest-first and trim anything past the
    /// retention limit. Excess deletes run concurrently and independently;
    /// a failed delete is logged and never hides the retained rows.
    pub async fn load(&self, uid: &UserId) -> Result<Vec<RecentSearch>, StoreError> {
        let documents = self
            .store
            .query_by_user(RECENT_SEARCHES_COLLECTION, uid)
            .await?;

        let rows: Vec<RecentSearch> = documents
            .iter()
            .filter_map(|document| match RecentSearch::from_document(document) {
                Ok(row) => Some(row),
                Err(err) => {
                    warn!(key = %document.key, error = %err, "skipping malformed recent search");
                    None
                }
            })
            .collect();

        let (kept, excess) = partition_newest(rows);

        if !excess.is_empty() {
            let deletes: Vec<_> = excess
                .iter()
                .map(|row| self.store.delete(RECENT_SEARCHES_COLLECTION, &row.id))
                .collect();

            for (row, result) in excess.iter().zip(join_all(deletes).await) {
                if let Err(err) = result {
                    warn!(id = %row.id, error = %err, "failed to delete excess recent search");
                }
            }
        }

        Ok(kept)
    }
}
