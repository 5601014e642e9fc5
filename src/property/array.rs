//! Array-of-scalar property node with per-element dirty tracking
//!
//! Besides the root dirty bit, the node keeps one dirty bit per element
//! so that change propagation can tell which positions moved. Element
//! bits are OR-combined across writes: once an index is dirty it stays
//! dirty until `clear_dirty_flags`, even if a later write restores the
//! original element.

use serde_json::Value;

use crate::schema::FieldType;
use crate::state::{scalar_to_json, Scalar, StateValue};

use super::convert::{coerce_json, coerce_scalar};
use super::errors::{PropertyError, PropertyResult};
use super::shape::Shape;

/// Canonical array representation: elements may be null
pub type ArrayValue = Vec<Option<Scalar>>;

/// A typed homogeneous array field
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    path: String,
    element_shape: Shape,
    value: Option<ArrayValue>,
    dirty: bool,
    child_dirty: Vec<bool>,
}

impl ArrayNode {
    /// Create an empty node for an array field type
    pub fn new(path: impl Into<String>, field_type: &FieldType) -> PropertyResult<Self> {
        let path = path.into();
        let element_shape = match field_type {
            FieldType::Array { element_type } if element_type.is_scalar() => {
                Shape::of_type(element_type)
            }
            other => {
                return Err(PropertyError::UnsupportedType {
                    path,
                    type_name: other.type_name(),
                })
            }
        };
        Ok(Self {
            path,
            element_shape,
            value: None,
            dirty: false,
            child_dirty: Vec::new(),
        })
    }

    /// Property path, `/`-separated from the document root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shape of the elements
    pub fn element_shape(&self) -> Shape {
        self.element_shape
    }

    /// Current value; `None` when unset
    pub fn value(&self) -> Option<&[Option<Scalar>]> {
        self.value.as_deref()
    }

    /// Number of elements (0 when unset)
    pub fn len(&self) -> usize {
        self.value.as_ref().map_or(0, Vec::len)
    }

    /// Returns true when unset or empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole array
    ///
    /// Element `i` becomes dirty if it differs from the previous element
    /// at `i`, if `i` is past the previous length, or if it was already
    /// dirty. An absent or empty array leaves no element bits.
    pub fn set_value(&mut self, value: Option<ArrayValue>) -> PropertyResult<()> {
        let value = match value {
            Some(items) => Some(self.coerce_elements(items)?),
            None => None,
        };

        let old = self.value.take();
        let old_items = old.as_deref().unwrap_or(&[]);
        let new_items = value.as_deref().unwrap_or(&[]);

        let child_dirty = new_items
            .iter()
            .enumerate()
            .map(|(i, new)| {
                let sticky = self.child_dirty.get(i).copied().unwrap_or(false);
                let changed = match old_items.get(i) {
                    Some(old) => old != new,
                    None => true,
                };
                sticky || changed
            })
            .collect();
        self.child_dirty = child_dirty;

        if !Self::is_same_value(old.as_deref(), value.as_deref()) {
            self.dirty = true;
        }
        self.value = value;
        Ok(())
    }

    /// Replace the value from a stored field value
    pub fn set_state_value(&mut self, value: &StateValue) -> PropertyResult<()> {
        match value {
            StateValue::Null => self.set_value(None),
            StateValue::Array(items) => self.set_value(Some(items.clone())),
            StateValue::Scalar(s) => self.set_value(Some(vec![Some(s.clone())])),
            other => Err(PropertyError::conversion(
                Shape::of_state(other),
                Shape::Array,
                &self.path,
            )),
        }
    }

    /// Replace the value from an externally supplied JSON value
    pub fn set_json(&mut self, value: &Value) -> PropertyResult<()> {
        let normalized = self.normalize(value)?;
        self.set_value(normalized)
    }

    /// Equality used for root dirtiness
    ///
    /// Element-wise, null-safe; an absent array equals an empty one.
    pub fn is_same_value(old: Option<&[Option<Scalar>]>, new: Option<&[Option<Scalar>]>) -> bool {
        old.unwrap_or(&[]) == new.unwrap_or(&[])
    }

    /// Whether the array changed since the last clear
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether element `index` changed since the last clear
    pub fn is_dirty_at(&self, index: usize) -> PropertyResult<bool> {
        self.child_dirty
            .get(index)
            .copied()
            .ok_or_else(|| PropertyError::IndexOutOfBounds {
                path: self.path.clone(),
                index,
                len: self.child_dirty.len(),
            })
    }

    /// Indexes of dirty elements, ascending
    pub fn dirty_indexes(&self) -> Vec<usize> {
        self.child_dirty
            .iter()
            .enumerate()
            .filter_map(|(i, dirty)| dirty.then_some(i))
            .collect()
    }

    /// Reset the root bit and every element bit
    pub fn clear_dirty_flags(&mut self) {
        self.dirty = false;
        self.child_dirty.iter_mut().for_each(|d| *d = false);
    }

    /// Coerce an external value into the canonical array representation
    ///
    /// Accepts null, a JSON array of scalars, or a single scalar (which
    /// becomes a one-element array). Objects and nested arrays fail.
    pub fn normalize(&self, value: &Value) -> PropertyResult<Option<ArrayValue>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    coerce_json(item, self.element_shape, &self.element_path(i))
                })
                .collect::<PropertyResult<ArrayValue>>()
                .map(Some),
            Value::Object(_) => Err(PropertyError::conversion(
                Shape::Map,
                Shape::Array,
                &self.path,
            )),
            single => Ok(Some(vec![coerce_json(
                single,
                self.element_shape,
                &self.element_path(0),
            )?])),
        }
    }

    /// Convert a stored array value to an external shape, rendered as JSON
    ///
    /// `Shape::Array` renders the elements as-is; a scalar shape equal to
    /// the element shape or `Shape::String` renders each element in that
    /// shape. Other targets fail.
    pub fn convert_to(&self, value: &StateValue, target: Shape) -> PropertyResult<Value> {
        let items = match value {
            StateValue::Null => return Ok(Value::Null),
            StateValue::Array(items) => items,
            other => {
                return Err(PropertyError::conversion(
                    Shape::of_state(other),
                    target,
                    &self.path,
                ))
            }
        };

        let element_target = match target {
            Shape::Array => self.element_shape,
            shape if shape.is_scalar() => shape,
            shape => {
                return Err(PropertyError::conversion(Shape::Array, shape, &self.path));
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                None => Ok(Value::Null),
                Some(s) => coerce_scalar(s, element_target, &self.element_path(i))
                    .map(|s| scalar_to_json(&s)),
            })
            .collect::<PropertyResult<Vec<_>>>()
            .map(Value::Array)
    }

    /// The empty value
    pub fn new_instance(&self) -> ArrayValue {
        Vec::new()
    }

    /// Stored representation of the current value
    pub fn state_value(&self) -> StateValue {
        self.value
            .clone()
            .map_or(StateValue::Null, StateValue::Array)
    }

    fn coerce_elements(&self, items: ArrayValue) -> PropertyResult<ArrayValue> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Some(s) if Shape::of_scalar(&s) != self.element_shape => {
                    coerce_scalar(&s, self.element_shape, &self.element_path(i)).map(Some)
                }
                other => Ok(other),
            })
            .collect()
    }

    fn element_path(&self, index: usize) -> String {
        format!("{}/{}", self.path, index)
    }
}
