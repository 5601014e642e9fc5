//! Store lifecycle, id generation, queries and concurrent access

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use docstore::state::keys::{KEY_ID, KEY_NAME, KEY_PARENT_ID};
use docstore::state::{DocumentState, Scalar, StateValue};
use docstore::store::{StateStore, StoreConfig, StoreError};

#[test]
fn test_create_id_uniqueness() {
    let store = StateStore::new(&StoreConfig::default()).unwrap();
    let ids: HashSet<String> = (0..500).map(|_| store.create_id()).collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn test_sequence_ids_increase() {
    let config = StoreConfig {
        id_generator: "sequence".to_string(),
        ..StoreConfig::default()
    };
    let store = StateStore::new(&config).unwrap();
    let ids: Vec<u64> = (0..50)
        .map(|_| store.create_id().parse().unwrap())
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_concurrent_creates_and_updates() {
    let store = Arc::new(StateStore::new(&StoreConfig::debug()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..100 {
                    let mut state = DocumentState::new();
                    state.put("writer", t as i64);
                    let id = store.create_document(state).unwrap();

                    let mut diff = DocumentState::new();
                    diff.put("seq", i as i64);
                    store.update_state(&id, &diff).unwrap();
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(all.insert(id));
        }
    }
    assert_eq!(store.document_count().unwrap(), 800);

    let states = store.read_states(&all.iter().cloned().collect::<Vec<_>>()).unwrap();
    assert_eq!(states.len(), 800);
    assert!(states.iter().all(|s| s.contains_key("seq") && s.id().is_some()));
}

#[test]
fn test_shutdown_discards_everything() {
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    let id = store.create_document(DocumentState::new()).unwrap();
    assert!(!store.supports_transactions());

    store.shutdown().unwrap();
    assert_eq!(store.read_state(&id).unwrap(), None);
    assert_eq!(store.get_lock(&id), Err(StoreError::not_found(id.as_str())));
    assert_eq!(store.document_count().unwrap(), 0);
}

#[test]
fn test_id_is_not_updatable() {
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    let id = store.create_document(DocumentState::new()).unwrap();

    let mut diff = DocumentState::new();
    diff.put(KEY_ID, "other");
    store.update_state(&id, &diff).unwrap();
    assert_eq!(
        store.read_state(&id).unwrap().unwrap().get(KEY_ID),
        Some(&StateValue::from(id.as_str()))
    );
}

#[test]
fn test_queries_follow_updates_and_deletes() {
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    let batch = (0..4)
        .map(|i| {
            let mut state = DocumentState::with_id(format!("doc{}", i));
            state.put(KEY_PARENT_ID, "folder");
            state.put(KEY_NAME, format!("file{}", i));
            state.put("status", if i % 2 == 0 { "draft" } else { "final" });
            state
        })
        .collect();
    assert_eq!(store.create_states(batch).unwrap(), 4);

    let none = HashSet::new();
    let draft = Scalar::from("draft");
    assert_eq!(store.query_key_value("status", &draft, &none).unwrap().len(), 2);

    let mut diff = DocumentState::new();
    diff.put("status", "draft");
    store.update_state("doc1", &diff).unwrap();
    assert_eq!(store.query_key_value("status", &draft, &none).unwrap().len(), 3);

    store.delete_states(["doc0"]).unwrap();
    assert!(!store.has_child("folder", "file0", &none).unwrap());
    assert!(store.has_child("folder", "file1", &none).unwrap());

    let ignored: HashSet<String> = ["doc1", "doc2"].iter().map(|s| s.to_string()).collect();
    assert!(!store.query_key_value_presence("status", &draft, &ignored).unwrap());
}
