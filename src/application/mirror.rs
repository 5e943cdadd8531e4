use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::warn;

use crate::domain::ids::VolumeId;
use crate::domain::markers::{MarkerEntry, MarkerKind};
use crate::domain::session::Identity;
use crate::domain::store::DocumentStore;

use super::markers::decode_entries;

/// Locally mirrored, always-current list of one user's marked books.
///
/// The mirror follows the identity stream: it opens a live query once an
/// identity exists, reopens it when the identity changes, and publishes an
/// empty snapshot on sign-out. Each published snapshot replaces the
/// previous one wholesale; consumers must never merge. This replacement
/// stream is the single source of truth for rendered state, and is the
/// mechanism that heals any optimistic state a toggle left behind.
///
/// Dropping the mirror tears the subscription down. In-flight toggles are
/// unaffected: they mutate durable remote state whether or not anything
/// is left watching.
pub struct MarkerMirror {
    snapshots: watch::Receiver<Vec<MarkerEntry>>,
    task: AbortHandle,
}

impl MarkerMirror {
    pub fn open(
        store: Arc<dyn DocumentStore>,
        kind: MarkerKind,
        auth: watch::Receiver<Option<Identity>>,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let task = tokio::spawn(run_mirror(store, kind, auth, tx)).abort_handle();
        Self {
            snapshots: rx,
            task,
        }
    }

    /// Subscribe to snapshot replacements.
    pub fn snapshots(&self) -> watch::Receiver<Vec<MarkerEntry>> {
        self.snapshots.clone()
    }

    /// The most recently delivered snapshot.
    pub fn current(&self) -> Vec<MarkerEntry> {
        self.snapshots.borrow().clone()
    }

    /// Derived "is this book currently marked" check against the current
    /// snapshot.
    pub fn contains(&self, book_id: &VolumeId) -> bool {
        self.snapshots
            .borrow()
            .iter()
            .any(|entry| &entry.book_id == book_id)
    }
}

impl Drop for MarkerMirror {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_mirror(
    store: Arc<dyn DocumentStore>,
    kind: MarkerKind,
    mut auth: watch::Receiver<Option<Identity>>,
    tx: watch::Sender<Vec<MarkerEntry>>,
) {
    loop {
        let identity = auth.borrow_and_update().clone();
        let Some(identity) = identity else {
            // Signed out: nothing to mirror until an identity appears.
            if tx.send(Vec::new()).is_err() {
                return;
            }
            if auth.changed().await.is_err() {
                return;
            }
            continue;
        };

        let mut live = store.watch_by_user(kind.collection(), &identity.uid);
        loop {
            tokio::select! {
                changed = auth.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Identity changed: drop this query and start over so a
                    // stale user's data never lands in the new session.
                    break;
                }
                snapshot = live.next() => match snapshot {
                    Some(Ok(documents)) => {
                        if tx.send(decode_entries(&documents)).is_err() {
                            return;
                        }
                    }
                    Some(Err(err)) => {
                        // Keep the last good snapshot rather than flashing
                        // an empty list; the stream ends after an error.
                        warn!(
                            collection = kind.collection(),
                            error = %err,
                            "live marker query failed"
                        );
                    }
                    None => {
                        // Stream over. Wait for an identity change before
                        // opening a new one.
                        if auth.changed().await.is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
        }
    }
}
