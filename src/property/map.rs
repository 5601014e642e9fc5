//! Container property node (complex field or document root)
//!
//! A map node has no value of its own. Its dirtiness is the OR of its
//! children's, and flattening walks the children.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::{FieldType, Schema};
use crate::state::keys::is_reserved;
use crate::state::{DocumentState, StateValue};

use super::errors::{PropertyError, PropertyResult};
use super::node::PropertyNode;
use super::shape::Shape;
use super::visitor::{DirtyPathCollector, PropertyVisitor};

/// A typed container of named child properties
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    path: String,
    children: BTreeMap<String, PropertyNode>,
}

impl MapNode {
    /// Build the root node for a document type
    pub fn from_schema(schema: &Schema) -> PropertyResult<Self> {
        Self::from_fields("", &schema.fields)
    }

    /// Build a node for a set of field definitions
    pub fn from_fields(
        path: impl Into<String>,
        fields: &BTreeMap<String, FieldType>,
    ) -> PropertyResult<Self> {
        let path = path.into();
        let mut children = BTreeMap::new();
        for (name, field_type) in fields {
            let child_path = format!("{}/{}", path, name);
            children.insert(name.clone(), PropertyNode::for_type(child_path, field_type)?);
        }
        Ok(Self { path, children })
    }

    /// Property path; empty for the document root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&PropertyNode> {
        self.children.get(name)
    }

    /// Direct child by name, mutable
    pub fn child_mut(&mut self, name: &str) -> Option<&mut PropertyNode> {
        self.children.get_mut(name)
    }

    /// Children in name order
    pub fn children(&self) -> impl Iterator<Item = &PropertyNode> {
        self.children.values()
    }

    /// Descendant by `/`-separated path relative to this node
    pub fn get(&self, path: &str) -> Option<&PropertyNode> {
        let mut segments = path.trim_matches('/').split('/');
        let mut node = self.children.get(segments.next()?)?;
        for segment in segments {
            node = node.as_map()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Descendant by `/`-separated path relative to this node, mutable
    pub fn get_mut(&mut self, path: &str) -> Option<&mut PropertyNode> {
        let mut segments = path.trim_matches('/').split('/');
        let mut node = self.children.get_mut(segments.next()?)?;
        for segment in segments {
            node = node.as_map_mut()?.children.get_mut(segment)?;
        }
        Some(node)
    }

    /// Like `get_mut`, failing with `UnknownField` when absent
    pub fn require_mut(&mut self, path: &str) -> PropertyResult<&mut PropertyNode> {
        let full = format!("{}/{}", self.path, path.trim_matches('/'));
        self.get_mut(path)
            .ok_or(PropertyError::UnknownField { path: full })
    }

    /// Replace all children from a state
    ///
    /// Children missing from `state` are unset. Reserved fields are
    /// ignored; other unknown fields fail.
    pub fn set_value(&mut self, state: &DocumentState) -> PropertyResult<()> {
        for (name, _) in state.iter() {
            if !is_reserved(name) && !self.children.contains_key(name) {
                return Err(PropertyError::UnknownField {
                    path: format!("{}/{}", self.path, name),
                });
            }
        }
        for (name, child) in self.children.iter_mut() {
            child.set_state_value(state.get(name).unwrap_or(&StateValue::Null))?;
        }
        Ok(())
    }

    /// Replace the value from a stored field value
    pub fn set_state_value(&mut self, value: &StateValue) -> PropertyResult<()> {
        match value {
            StateValue::Null => self.set_value(&DocumentState::new()),
            StateValue::State(state) => self.set_value(state),
            other => Err(PropertyError::conversion(
                Shape::of_state(other),
                Shape::Map,
                &self.path,
            )),
        }
    }

    /// Replace the value from an externally supplied JSON object
    ///
    /// Only keys present in the object are written; null unsets.
    pub fn set_json(&mut self, value: &Value) -> PropertyResult<()> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return self.set_value(&DocumentState::new()),
            other => {
                return Err(PropertyError::conversion(
                    Shape::of_json(other),
                    Shape::Map,
                    &self.path,
                ))
            }
        };
        for (name, field) in object {
            let path = format!("{}/{}", self.path, name);
            self.children
                .get_mut(name)
                .ok_or(PropertyError::UnknownField { path })?
                .set_json(field)?;
        }
        Ok(())
    }

    /// Populate from a stored state and start clean
    pub fn load(&mut self, state: &DocumentState) -> PropertyResult<()> {
        self.set_value(state)?;
        self.clear_dirty_flags();
        Ok(())
    }

    /// Flatten the tree into a state; unset children and empty maps are
    /// omitted
    pub fn to_state(&self) -> DocumentState {
        self.children
            .iter()
            .map(|(name, child)| (name.clone(), child.state_value()))
            .filter(|(_, value)| match value {
                StateValue::Null => false,
                StateValue::State(nested) => !nested.is_empty(),
                _ => true,
            })
            .collect()
    }

    /// Stored representation of the current value
    pub fn state_value(&self) -> StateValue {
        StateValue::State(self.to_state())
    }

    /// Flatten only the dirty children into a diff
    ///
    /// Unset dirty children appear as `Null` so the diff removes them.
    /// A dirty nested map is written whole, or as `Null` once it is empty,
    /// matching what `to_state` omits.
    pub fn dirty_state(&self) -> DocumentState {
        self.children
            .iter()
            .filter(|(_, child)| child.is_dirty())
            .map(|(name, child)| {
                let value = match child.state_value() {
                    StateValue::State(nested) if nested.is_empty() => StateValue::Null,
                    value => value,
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Paths of dirty leaves under this node
    pub fn dirty_paths(&self) -> Vec<String> {
        let mut collector = DirtyPathCollector::new();
        self.accept(&mut collector);
        collector.into_paths()
    }

    /// The empty value
    pub fn new_instance(&self) -> DocumentState {
        DocumentState::new()
    }

    /// Whether any child changed since the last clear
    pub fn is_dirty(&self) -> bool {
        self.children.values().any(PropertyNode::is_dirty)
    }

    /// Reset dirtiness of every descendant
    pub fn clear_dirty_flags(&mut self) {
        self.children
            .values_mut()
            .for_each(PropertyNode::clear_dirty_flags);
    }

    /// Visit this map, then its children unless the visitor declines
    pub fn accept<V: PropertyVisitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_map(self) {
            for child in self.children.values() {
                child.accept(visitor);
            }
        }
    }
}
