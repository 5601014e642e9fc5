//! The `PropertyNode` sum type over scalar, array and map nodes

use serde_json::Value;

use crate::schema::FieldType;
use crate::state::StateValue;

use super::array::ArrayNode;
use super::errors::PropertyResult;
use super::map::MapNode;
use super::scalar::ScalarNode;
use super::visitor::PropertyVisitor;

/// Typed in-memory view over one field of a document
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    Scalar(ScalarNode),
    Array(ArrayNode),
    Map(MapNode),
}

impl PropertyNode {
    /// Build an empty node for a field type
    pub fn for_type(path: impl Into<String>, field_type: &FieldType) -> PropertyResult<Self> {
        let path = path.into();
        Ok(match field_type {
            FieldType::Object { fields } => PropertyNode::Map(MapNode::from_fields(path, fields)?),
            FieldType::Array { .. } => PropertyNode::Array(ArrayNode::new(path, field_type)?),
            scalar => PropertyNode::Scalar(ScalarNode::new(path, scalar)?),
        })
    }

    /// Property path, `/`-separated from the document root
    pub fn path(&self) -> &str {
        match self {
            PropertyNode::Scalar(n) => n.path(),
            PropertyNode::Array(n) => n.path(),
            PropertyNode::Map(n) => n.path(),
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Whether anything under this node changed since the last clear
    pub fn is_dirty(&self) -> bool {
        match self {
            PropertyNode::Scalar(n) => n.is_dirty(),
            PropertyNode::Array(n) => n.is_dirty(),
            PropertyNode::Map(n) => n.is_dirty(),
        }
    }

    /// Reset dirtiness, recursing into map children
    pub fn clear_dirty_flags(&mut self) {
        match self {
            PropertyNode::Scalar(n) => n.clear_dirty_flags(),
            PropertyNode::Array(n) => n.clear_dirty_flags(),
            PropertyNode::Map(n) => n.clear_dirty_flags(),
        }
    }

    /// Replace the value from a stored field value
    pub fn set_state_value(&mut self, value: &StateValue) -> PropertyResult<()> {
        match self {
            PropertyNode::Scalar(n) => n.set_state_value(value),
            PropertyNode::Array(n) => n.set_state_value(value),
            PropertyNode::Map(n) => n.set_state_value(value),
        }
    }

    /// Replace the value from an externally supplied JSON value
    pub fn set_json(&mut self, value: &Value) -> PropertyResult<()> {
        match self {
            PropertyNode::Scalar(n) => n.set_json(value),
            PropertyNode::Array(n) => n.set_json(value),
            PropertyNode::Map(n) => n.set_json(value),
        }
    }

    /// Stored representation of the current value
    pub fn state_value(&self) -> StateValue {
        match self {
            PropertyNode::Scalar(n) => n.state_value(),
            PropertyNode::Array(n) => n.state_value(),
            PropertyNode::Map(n) => n.state_value(),
        }
    }

    /// Stored representation of the empty value
    pub fn new_instance(&self) -> StateValue {
        match self {
            PropertyNode::Scalar(_) => StateValue::Null,
            PropertyNode::Array(n) => StateValue::Array(n.new_instance()),
            PropertyNode::Map(n) => StateValue::State(n.new_instance()),
        }
    }

    /// Walk this node and its descendants
    pub fn accept<V: PropertyVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            PropertyNode::Scalar(n) => visitor.visit_scalar(n),
            PropertyNode::Array(n) => visitor.visit_array(n),
            PropertyNode::Map(n) => n.accept(visitor),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarNode> {
        match self {
            PropertyNode::Scalar(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut ScalarNode> {
        match self {
            PropertyNode::Scalar(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            PropertyNode::Array(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            PropertyNode::Array(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapNode> {
        match self {
            PropertyNode::Map(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MapNode> {
        match self {
            PropertyNode::Map(n) => Some(n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_type_picks_variant() {
        let scalar = PropertyNode::for_type("/title", &FieldType::String).unwrap();
        assert!(scalar.as_scalar().is_some());

        let array = PropertyNode::for_type("/tags", &FieldType::array_of(FieldType::String)).unwrap();
        assert!(array.as_array().is_some());

        let map = PropertyNode::for_type(
            "/author",
            &FieldType::object([("name", FieldType::String)]),
        )
        .unwrap();
        assert!(map.as_map().is_some());
        assert_eq!(map.name(), "author");
    }

    #[test]
    fn test_new_instance_per_variant() {
        let array = PropertyNode::for_type("/tags", &FieldType::array_of(FieldType::Long)).unwrap();
        assert_eq!(array.new_instance(), StateValue::Array(vec![]));

        let scalar = PropertyNode::for_type("/n", &FieldType::Long).unwrap();
        assert_eq!(scalar.new_instance(), StateValue::Null);
    }
}
