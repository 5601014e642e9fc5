//! Typed, dirty-tracking property model
//!
//! A document is viewed through a tree of property nodes built from its
//! schema:
//! - `ScalarNode`: one typed value, dirty when it changes
//! - `ArrayNode`: homogeneous scalar array with a root dirty bit and one
//!   sticky dirty bit per element
//! - `MapNode`: container of named children; never dirty by itself
//!
//! Trees load from and flatten into `DocumentState`. `MapNode::dirty_state`
//! yields the minimal diff to hand to the store, so change propagation
//! does not need to re-diff whole documents.
//!
//! External values enter through `normalize`/`set_json` and leave through
//! `convert_to`; shape mismatches fail with `PropertyError::Conversion`
//! naming both shapes and the property path.

mod array;
mod convert;
mod errors;
mod map;
mod node;
mod scalar;
mod shape;
mod visitor;

pub use array::{ArrayNode, ArrayValue};
pub use convert::{coerce_json, coerce_scalar};
pub use errors::{PropertyError, PropertyResult};
pub use map::MapNode;
pub use node::PropertyNode;
pub use scalar::ScalarNode;
pub use shape::Shape;
pub use visitor::{DirtyPathCollector, PropertyVisitor};
