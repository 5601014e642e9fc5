//! Schema contract for the property model
//!
//! The type registry proper lives outside this crate; this module only
//! carries what is needed to build typed property trees:
//! - field types (scalars, objects, scalar arrays)
//! - a named set of top-level fields per document type
//!
//! Documents are not validated against schemas by the store.

mod types;

pub use types::{FieldType, Schema};
