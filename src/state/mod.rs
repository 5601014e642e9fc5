//! Document state model
//!
//! The value stored per document: a mapping from field name to scalar,
//! array, nested state, or list of nested states. Reserved fields hold
//! the document id, lock metadata and referenced binary keys.

mod json;
pub mod keys;
mod value;

pub use json::{scalar_to_json, state_from_json, state_to_json, value_to_json, StateJsonError};
pub(crate) use json::scalar_from_json;
pub use value::{DocumentState, Scalar, StateValue};
