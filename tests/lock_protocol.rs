//! Lock protocol through the store

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, TimeZone, Utc};

use docstore::lock::{Administrators, Lock};
use docstore::state::DocumentState;
use docstore::store::{StateStore, StoreConfig, StoreError};

fn t(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
}

fn store_with_doc1() -> StateStore {
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    store.create_state(DocumentState::with_id("doc1")).unwrap();
    store
}

// =============================================================================
// FIRST WRITER WINS
// =============================================================================

#[test]
fn test_set_lock_first_writer_wins() {
    let store = store_with_doc1();

    assert_eq!(store.set_lock("doc1", &Lock::new("alice", t(1))).unwrap(), None);
    assert_eq!(
        store.set_lock("doc1", &Lock::new("bob", t(2))).unwrap(),
        Some(Lock::new("alice", t(1)))
    );
    assert_eq!(store.get_lock("doc1").unwrap(), Some(Lock::new("alice", t(1))));
}

// =============================================================================
// REMOVAL
// =============================================================================

#[test]
fn test_remove_by_non_owner_is_mismatch() {
    let store = store_with_doc1();
    store.set_lock("doc1", &Lock::new("alice", t(1))).unwrap();

    let result = store.remove_lock("doc1", Some("bob")).unwrap().unwrap();
    assert!(result.failed);
    assert_eq!(result.owner, "alice");
    assert_eq!(result.created, t(1));
    assert_eq!(store.get_lock("doc1").unwrap(), Some(Lock::new("alice", t(1))));

    assert_eq!(
        store.remove_lock("doc1", Some("alice")).unwrap(),
        Some(Lock::new("alice", t(1)))
    );
    assert_eq!(store.get_lock("doc1").unwrap(), None);
    assert_eq!(store.remove_lock("doc1", Some("alice")).unwrap(), None);

    let metrics = store.metrics().snapshot();
    assert_eq!(metrics.lock_removal_mismatches, 1);
    assert_eq!(metrics.locks_removed, 1);
}

#[test]
fn test_override_authority() {
    let config = StoreConfig::debug();
    let store = StateStore::with_authority(&config, Arc::new(Administrators::new(["admin"]))).unwrap();
    store.create_state(DocumentState::with_id("doc1")).unwrap();
    store.set_lock("doc1", &Lock::new("alice", t(1))).unwrap();

    assert_eq!(
        store.remove_lock("doc1", Some("admin")).unwrap(),
        Some(Lock::new("alice", t(1)))
    );
}

#[test]
fn test_unknown_document() {
    let store = store_with_doc1();
    assert_eq!(
        store.get_lock("unknown-id"),
        Err(StoreError::DocumentNotFound("unknown-id".into()))
    );
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_exactly_one_concurrent_locker_wins() {
    let store = Arc::new(store_with_doc1());
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .set_lock("doc1", &Lock::new(format!("user{}", i), t(0)))
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_none()).count(), 1);

    let holder = store.get_lock("doc1").unwrap().unwrap();
    for existing in results.into_iter().flatten() {
        assert_eq!(existing, holder);
    }
    assert_eq!(store.metrics().snapshot().lock_conflicts, 15);
}
