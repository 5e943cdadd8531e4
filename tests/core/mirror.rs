use std::sync::Arc;
use std::time::Duration;

use shelfmark::application::{MarkerMirror, MarkerService, ToggleOutcome};
use shelfmark::domain::ids::VolumeId;
use shelfmark::domain::markers::{MarkerEntry, MarkerKind};
use shelfmark::domain::store::DocumentStore;
use shelfmark::infrastructure::store::MemoryDocumentStore;
use tokio::sync::watch;

use crate::helpers::{identity, wait_for_snapshot};

fn entry(book_id: &str, title: &str) -> MarkerEntry {
    MarkerEntry {
        book_id: VolumeId::from(book_id),
        book_title: title.to_string(),
    }
}

#[tokio::test]
async fn mirror_follows_toggles_for_the_signed_in_user() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = MarkerService::new(store.clone());
    let user = identity("u1");
    let (_auth_tx, auth_rx) = watch::channel(Some(user.clone()));

    let mirror = MarkerMirror::open(store, MarkerKind::Favourite, auth_rx);
    let mut snapshots = mirror.snapshots();

    let book = VolumeId::from("b1");
    service
        .toggle(MarkerKind::Favourite, Some(&user), &book, "Dune")
        .await
        .unwrap();

    let snapshot = wait_for_snapshot(&mut snapshots, |entries| !entries.is_empty()).await;
    assert_eq!(snapshot, vec![entry("b1", "Dune")]);
    assert!(mirror.contains(&book));

    service
        .toggle(MarkerKind::Favourite, Some(&user), &book, "Dune")
        .await
        .unwrap();

    wait_for_snapshot(&mut snapshots, |entries| entries.is_empty()).await;
    assert!(!mirror.contains(&book));
}

#[tokio::test]
async fn mirror_stays_empty_until_an_identity_appears() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = MarkerService::new(store.clone());
    let user = identity("u1");

    service
        .toggle(
            MarkerKind::Favourite,
            Some(&user),
            &VolumeId::from("b1"),
            "Dune",
        )
        .await
        .unwrap();

    let (auth_tx, auth_rx) = watch::channel(None);
    let mirror = MarkerMirror::open(store, MarkerKind::Favourite, auth_rx);
    let mut snapshots = mirror.snapshots();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(mirror.current().is_empty());

    auth_tx.send(Some(user)).unwrap();
    let snapshot = wait_for_snapshot(&mut snapshots, |entries| !entries.is_empty()).await;
    assert_eq!(snapshot, vec![entry("b1", "Dune")]);
}

#[tokio::test]
async fn sign_out_clears_the_snapshot() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = MarkerService::new(store.clone());
    let user = identity("u1");

    service
        .toggle(MarkerKind::Read, Some(&user), &VolumeId::from("b1"), "Dune")
        .await
        .unwrap();

    let (auth_tx, auth_rx) = watch::channel(Some(user));
    let mirror = MarkerMirror::open(store, MarkerKind::Read, auth_rx);
    let mut snapshots = mirror.snapshots();

    wait_for_snapshot(&mut snapshots, |entries| !entries.is_empty()).await;

    auth_tx.send(None).unwrap();
    wait_for_snapshot(&mut snapshots, |entries| entries.is_empty()).await;
    assert!(!mirror.contains(&VolumeId::from("b1")));
}

#[tokio::test]
async fn identity_switch_replaces_the_snapshot_wholesale() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = MarkerService::new(store.clone());
    let alice = identity("alice");
    let bob = identity("bob");

    service
        .toggle(
            MarkerKind::Favourite,
            Some(&alice),
            &VolumeId::from("b1"),
            "Dune",
        )
        .await
        .unwrap();
    service
        .toggle(
            MarkerKind::Favourite,
            Some(&bob),
            &VolumeId::from("b2"),
            "Hyperion",
        )
        .await
        .unwrap();
    service
        .toggle(
            MarkerKind::Favourite,
            Some(&bob),
            &VolumeId::from("b3"),
            "Ubik",
        )
        .await
        .unwrap();

    let (auth_tx, auth_rx) = watch::channel(Some(alice));
    let mirror = MarkerMirror::open(store, MarkerKind::Favourite, auth_rx);
    let mut snapshots = mirror.snapshots();

    let snapshot = wait_for_snapshot(&mut snapshots, |entries| !entries.is_empty()).await;
    assert_eq!(snapshot, vec![entry("b1", "Dune")]);

    auth_tx.send(Some(bob)).unwrap();
    let snapshot = wait_for_snapshot(&mut snapshots, |entries| {
        entries.iter().any(|e| e.book_id == VolumeId::from("b2"))
    })
    .await;
    assert_eq!(snapshot, vec![entry("b2", "Hyperion"), entry("b3", "Ubik")]);
}

#[tokio::test]
async fn dropping_the_mirror_ends_delivery_but_not_toggles() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = MarkerService::new(store.clone());
    let user = identity("u1");
    let (_auth_tx, auth_rx) = watch::channel(Some(user.clone()));

    let mirror = MarkerMirror::open(store.clone(), MarkerKind::Favourite, auth_rx);
    let mut snapshots = mirror.snapshots();
    drop(mirror);

    // The publishing task is aborted, so the channel closes.
    tokio::time::timeout(Duration::from_secs(5), async {
        while snapshots.changed().await.is_ok() {}
    })
    .await
    .expect("snapshot channel should close after drop");

    let book = VolumeId::from("b1");
    let outcome = service
        .toggle(MarkerKind::Favourite, Some(&user), &book, "Dune")
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Added);
    assert!(store.get("favourites", "u1_b1").await.unwrap().is_some());
}
