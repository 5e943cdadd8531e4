use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::domain::errors::StoreError;
use crate::domain::ids::{UserId, VolumeId};
use crate::domain::markers::{MarkerEntry, MarkerKind, UserMarker, composite_key};
use crate::domain::session::Identity;
use crate::domain::store::{Document, DocumentStore};

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Marker created; the book is now marked.
    Added,
    /// Marker deleted; the book is no longer marked.
    Removed,
    /// No authenticated identity; the store was never contacted.
    Skipped,
}

impl ToggleOutcome {
    /// Post-toggle boolean state, when the toggle ran at all.
    pub fn marked(self) -> Option<bool> {
        match self {
            ToggleOutcome::Added => Some(true),
            ToggleOutcome::Removed => Some(false),
            ToggleOutcome::Skipped => None,
        }
    }
}

/// Idempotent toggle of user-book markers against the document store.
#[derive(Clone)]
pub struct MarkerService {
    store: Arc<dyn DocumentStore>,
}

impl MarkerService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Flip the marker for (identity, book): one point read, then at most
    /// one write or delete. The read and the mutation are not atomic;
    /// concurrent toggles on the same key race, and the live mirror is
    /// what reconciles the store's final state back into the UI.
    ///
    /// Without an identity this returns [`ToggleOutcome::Skipped`]
    /// immediately, never contacting the store. Store errors propagate
    /// unchanged; the caller should treat them as "state unknown until the
    /// next snapshot".
    pub async fn toggle(
        &self,
        kind: MarkerKind,
        identity: Option<&Identity>,
        book_id: &VolumeId,
        book_title: &str,
    ) -> Result<ToggleOutcome, StoreError> {
        let Some(identity) = identity else {
            return Ok(ToggleOutcome::Skipped);
        };

        let collection = kind.collection();
        let key = composite_key(&identity.uid, book_id);

        if self.store.exists(collection, &key).await? {
            self.store.delete(collection, &key).await?;
            Ok(ToggleOutcome::Removed)
        } else {
            let marker = UserMarker {
                uid: identity.uid.clone(),
                book_id: book_id.clone(),
                book_title: book_title.to_string(),
                timestamp: Utc::now(),
            };
            let payload = serde_json::to_value(&marker)
                .map_err(|err| StoreError::unexpected(err.to_string()))?;
            self.store.write(collection, &key, payload).await?;
            Ok(ToggleOutcome::Added)
        }
    }

    /// Keyed point check for views that do not hold a whole snapshot.
    /// Callers re-run this whenever the identity or the target book
    /// changes.
    pub async fn is_marked(
        &self,
        kind: MarkerKind,
        uid: &UserId,
        book_id: &VolumeId,
    ) -> Result<bool, StoreError> {
        self.store
            .exists(kind.collection(), &composite_key(uid, book_id))
            .await
    }

    /// One-shot query of all markers of one kind for a user, in the same
    /// shape a live snapshot delivers.
    pub async fn list(
        &self,
        kind: MarkerKind,
        uid: &UserId,
    ) -> Result<Vec<MarkerEntry>, StoreError> {
        let documents = self.store.query_by_user(kind.collection(), uid).await?;
        Ok(decode_entries(&documents))
    }
}

/// Decode snapshot documents into list entries, skipping malformed ones.
pub(crate) fn decode_entries(documents: &[Document]) -> Vec<MarkerEntry> {
    documents
        .iter()
        .filter_map(|document| {
            match serde_json::from_value::<UserMarker>(document.data.clone()) {
                Ok(marker) => Some(MarkerEntry::from(marker)),
                Err(err) => {
                    warn!(key = %document.key, error = %err, "skipping malformed marker document");
                    None
                }
            }
        })
        .collect()
}
