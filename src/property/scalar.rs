//! Scalar property node

use serde_json::Value;

use crate::schema::FieldType;
use crate::state::{scalar_to_json, Scalar, StateValue};

use super::convert::{coerce_json, coerce_scalar};
use super::errors::{PropertyError, PropertyResult};
use super::shape::Shape;

/// A single typed scalar field
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    path: String,
    shape: Shape,
    value: Option<Scalar>,
    dirty: bool,
}

impl ScalarNode {
    /// Create an empty node for a scalar field type
    pub fn new(path: impl Into<String>, field_type: &FieldType) -> PropertyResult<Self> {
        let path = path.into();
        if !field_type.is_scalar() {
            return Err(PropertyError::UnsupportedType {
                path,
                type_name: field_type.type_name(),
            });
        }
        Ok(Self {
            path,
            shape: Shape::of_type(field_type),
            value: None,
            dirty: false,
        })
    }

    /// Property path, `/`-separated from the document root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical shape of the value
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Current value
    pub fn value(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    /// Replace the value; the node becomes dirty if the value changed
    pub fn set_value(&mut self, value: Option<Scalar>) -> PropertyResult<()> {
        let value = match value {
            Some(v) => Some(coerce_scalar(&v, self.shape, &self.path)?),
            None => None,
        };
        if value != self.value {
            self.value = value;
            self.dirty = true;
        }
        Ok(())
    }

    /// Replace the value from a stored field value
    pub fn set_state_value(&mut self, value: &StateValue) -> PropertyResult<()> {
        match value {
            StateValue::Null => self.set_value(None),
            StateValue::Scalar(s) => self.set_value(Some(s.clone())),
            other => Err(PropertyError::conversion(
                Shape::of_state(other),
                self.shape,
                &self.path,
            )),
        }
    }

    /// Replace the value from an externally supplied JSON value
    pub fn set_json(&mut self, value: &Value) -> PropertyResult<()> {
        let normalized = self.normalize(value)?;
        self.set_value(normalized)
    }

    /// Coerce an external value to this node's canonical representation
    pub fn normalize(&self, value: &Value) -> PropertyResult<Option<Scalar>> {
        coerce_json(value, self.shape, &self.path)
    }

    /// Convert the current value to another scalar shape, rendered as JSON
    pub fn convert_to(&self, target: Shape) -> PropertyResult<Value> {
        match &self.value {
            None => Ok(Value::Null),
            Some(_) if !target.is_scalar() => Err(PropertyError::conversion(
                self.shape,
                target,
                &self.path,
            )),
            Some(v) => Ok(scalar_to_json(&coerce_scalar(v, target, &self.path)?)),
        }
    }

    /// The empty value
    pub fn new_instance(&self) -> Option<Scalar> {
        None
    }

    /// Stored representation of the current value
    pub fn state_value(&self) -> StateValue {
        self.value
            .clone()
            .map_or(StateValue::Null, StateValue::Scalar)
    }

    /// Whether the value changed since the last clear
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset dirtiness
    pub fn clear_dirty_flags(&mut self) {
        self.dirty = false;
    }
}
