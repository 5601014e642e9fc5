//! Reserved field names inside a `DocumentState`
//!
//! These keys share the namespace of ordinary schema fields, so they
//! carry a prefix that schema field names cannot use.

/// Document id, written by the store on creation
pub const KEY_ID: &str = "ecm:id";

/// Id of the containing document
pub const KEY_PARENT_ID: &str = "ecm:parentId";

/// Name of the document within its parent
pub const KEY_NAME: &str = "ecm:name";

/// Owner name of the current lock (absent when unlocked)
pub const KEY_LOCK_OWNER: &str = "ecm:lockOwner";

/// Creation timestamp of the current lock
pub const KEY_LOCK_CREATED: &str = "ecm:lockCreated";

/// Array of binary keys referenced by the document
pub const KEY_BLOB_KEYS: &str = "ecm:blobKeys";

/// Prefix reserved for system fields
pub const RESERVED_PREFIX: &str = "ecm:";

/// Returns true if `name` is a reserved system field
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Both lock fields, in the order they are cleared
pub const LOCK_FIELDS: [&str; 2] = [KEY_LOCK_OWNER, KEY_LOCK_CREATED];
