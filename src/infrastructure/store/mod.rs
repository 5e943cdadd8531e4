mod memory;
mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use tokio::sync::{mpsc, watch};

use crate::domain::ids::UserId;
use crate::domain::store::{DocumentStore, LiveQuery};

const SNAPSHOT_BUFFER: usize = 16;

/// Drive a [`LiveQuery`] off a store revision counter: deliver the current
/// result set immediately, then re-query and redeliver after every store
/// change. The task ends when the subscriber drops the handle, when the
/// store goes away, or after delivering one errored snapshot.
pub(crate) fn spawn_live_query<S>(
    store: S,
    mut revision: watch::Receiver<u64>,
    collection: String,
    uid: UserId,
) -> LiveQuery
where
    S: DocumentStore + Clone + 'static,
{
    let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);

    tokio::spawn(async move {
        loop {
            // Mark the revision seen before querying: a write racing the
            // query bumps it again and triggers an immediate re-query, so
            // no change is ever missed.
            revision.borrow_and_update();

            let snapshot = store.query_by_user(&collection, &uid).await;
            let errored = snapshot.is_err();
            if tx.send(snapshot).await.is_err() {
                // Subscriber unsubscribed.
                return;
            }
            if errored {
                return;
            }

            if revision.changed().await.is_err() {
                // Store dropped; no further changes can occur.
                return;
            }
        }
    });

    LiveQuery::new(rx)
}
