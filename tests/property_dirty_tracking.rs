//! Dirty tracking across property trees
//!
//! Covers element-level dirtiness on arrays, sticky dirty bits, clearing,
//! the diff a tree produces for the store, and numeric range checks.

use serde_json::json;

use docstore::property::{ArrayNode, MapNode, PropertyError, Shape};
use docstore::schema::{FieldType, Schema};
use docstore::state::{DocumentState, Scalar, StateValue};
use docstore::store::{StateStore, StoreConfig};

fn strings(items: &[&str]) -> Option<Vec<Option<Scalar>>> {
    Some(items.iter().map(|s| Some(Scalar::from(*s))).collect())
}

fn tags() -> ArrayNode {
    ArrayNode::new("/tags", &FieldType::array_of(FieldType::String)).unwrap()
}

// =============================================================================
// ARRAY ELEMENT DIRTINESS
// =============================================================================

#[test]
fn test_changed_indexes_are_dirty() {
    let mut node = tags();
    node.set_value(strings(&["a", "b", "c"])).unwrap();
    node.clear_dirty_flags();

    node.set_value(strings(&["a", "x", "c", "d"])).unwrap();
    assert!(!node.is_dirty_at(0).unwrap());
    assert!(node.is_dirty_at(1).unwrap());
    assert!(!node.is_dirty_at(2).unwrap());
    assert!(node.is_dirty_at(3).unwrap());
    assert!(node.is_dirty());
}

#[test]
fn test_unchanged_trailing_indexes_stay_clean() {
    let mut node = tags();
    node.set_value(strings(&["a", "b", "c", "d"])).unwrap();
    node.clear_dirty_flags();

    node.set_value(strings(&["z", "b", "c", "d"])).unwrap();
    assert_eq!(node.dirty_indexes(), vec![0]);
}

#[test]
fn test_dirty_bits_are_sticky() {
    let mut node = tags();
    node.set_value(strings(&["a", "b"])).unwrap();
    node.clear_dirty_flags();

    node.set_value(strings(&["a", "x"])).unwrap();
    node.set_value(strings(&["a", "b"])).unwrap();
    assert!(node.is_dirty_at(1).unwrap());
    assert!(!node.is_dirty_at(0).unwrap());

    node.clear_dirty_flags();
    assert!(!node.is_dirty());
    assert!(!node.is_dirty_at(0).unwrap());
    assert!(!node.is_dirty_at(1).unwrap());
}

#[test]
fn test_out_of_range_query() {
    let mut node = tags();
    node.set_value(strings(&["a"])).unwrap();
    let err = node.is_dirty_at(1).unwrap_err();
    assert_eq!(
        err,
        PropertyError::IndexOutOfBounds {
            path: "/tags".into(),
            index: 1,
            len: 1
        }
    );
}

#[test]
fn test_empty_resets_dirty_vector() {
    let mut node = tags();
    node.set_value(strings(&["a", "b"])).unwrap();
    node.set_value(Some(vec![])).unwrap();
    assert!(node.dirty_indexes().is_empty());
    assert!(node.is_dirty_at(0).is_err());
}

#[test]
fn test_null_and_empty_are_same() {
    let empty: &[Option<Scalar>] = &[];
    assert!(ArrayNode::is_same_value(None, Some(empty)));
    assert!(ArrayNode::is_same_value(Some(empty), None));

    let mut node = tags();
    node.set_value(Some(vec![])).unwrap();
    assert!(!node.is_dirty());
    node.set_value(None).unwrap();
    assert!(!node.is_dirty());
}

// =============================================================================
// NORMALIZATION
// =============================================================================

#[test]
fn test_normalize_and_convert() {
    let node = ArrayNode::new("/sizes", &FieldType::array_of(FieldType::Long)).unwrap();

    let normalized = node.normalize(&json!(["1", 2, null])).unwrap().unwrap();
    assert_eq!(
        normalized,
        vec![Some(Scalar::Long(1)), Some(Scalar::Long(2)), None]
    );
    assert_eq!(
        node.normalize(&json!(7)).unwrap(),
        Some(vec![Some(Scalar::Long(7))])
    );

    let err = node.normalize(&json!({"a": 1})).unwrap_err();
    assert_eq!(err, PropertyError::conversion(Shape::Map, Shape::Array, "/sizes"));

    let stored = StateValue::Array(normalized);
    assert_eq!(
        node.convert_to(&stored, Shape::String).unwrap(),
        json!(["1", "2", null])
    );
    assert!(node.convert_to(&stored, Shape::Map).is_err());
}

// =============================================================================
// TREE TO STORE
// =============================================================================

fn schema() -> Schema {
    Schema::new(
        "Note",
        [
            ("title", FieldType::String),
            ("tags", FieldType::array_of(FieldType::String)),
            (
                "meta",
                FieldType::object([("views", FieldType::Long), ("draft", FieldType::Boolean)]),
            ),
        ],
    )
}

#[test]
fn test_dirty_state_round_trips_through_store() {
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    let mut initial = DocumentState::new();
    initial.put("title", "draft");
    initial.put("tags", StateValue::strings(["a"]));
    let id = store.create_document(initial).unwrap();

    let mut tree = MapNode::from_schema(&schema()).unwrap();
    tree.load(&store.read_state(&id).unwrap().unwrap()).unwrap();
    assert!(!tree.is_dirty());

    tree.require_mut("meta/views").unwrap().set_json(&json!(12)).unwrap();
    tree.require_mut("title").unwrap().set_json(&json!(null)).unwrap();
    assert_eq!(tree.dirty_paths(), vec!["/meta/views", "/title"]);

    store.update_state(&id, &tree.dirty_state()).unwrap();
    tree.clear_dirty_flags();

    let stored = store.read_state(&id).unwrap().unwrap();
    assert!(!stored.contains_key("title"));
    assert_eq!(stored.get("tags"), Some(&StateValue::strings(["a"])));
    let meta = stored.get("meta").and_then(StateValue::as_state).unwrap();
    assert_eq!(meta.get("views"), Some(&StateValue::from(12i64)));

    let mut reloaded = MapNode::from_schema(&schema()).unwrap();
    reloaded.load(&stored).unwrap();
    assert_eq!(reloaded.to_state(), tree.to_state());
}

#[test]
fn test_emptied_nested_map_is_removed_from_store() {
    let schema = Schema::new(
        "Book",
        [
            ("title", FieldType::String),
            ("author", FieldType::object([("name", FieldType::String)])),
        ],
    );
    let store = StateStore::new(&StoreConfig::debug()).unwrap();
    let mut tree = MapNode::from_schema(&schema).unwrap();
    tree.set_json(&json!({"title": "t", "author": {"name": "alice"}}))
        .unwrap();
    let id = store.create_document(tree.to_state()).unwrap();

    tree.load(&store.read_state(&id).unwrap().unwrap()).unwrap();
    tree.require_mut("author/name").unwrap().set_json(&json!(null)).unwrap();
    store.update_state(&id, &tree.dirty_state()).unwrap();

    let mut stored = store.read_state(&id).unwrap().unwrap();
    assert!(!stored.contains_key("author"));
    stored.remove(docstore::state::keys::KEY_ID);
    assert_eq!(stored, tree.to_state());
}

// =============================================================================
// NUMERIC RANGE
// =============================================================================

#[test]
fn test_out_of_range_numbers_are_rejected() {
    let mut pages = docstore::property::ScalarNode::new("/pages", &FieldType::Long).unwrap();
    for huge in [json!(1e20), json!(18446744073709551615u64)] {
        let err = pages.set_json(&huge).unwrap_err();
        assert_eq!(err, PropertyError::conversion(Shape::Double, Shape::Long, "/pages"));
    }
    assert!(pages.value().is_none());
    assert!(!pages.is_dirty());

    let sizes = ArrayNode::new("/sizes", &FieldType::array_of(FieldType::Double)).unwrap();
    let err = sizes.normalize(&json!([1, i64::MAX])).unwrap_err();
    assert_eq!(err, PropertyError::conversion(Shape::Long, Shape::Double, "/sizes/1"));
}
