//! Value shapes, as reported in conversion errors

use std::fmt;

use serde_json::Value;

use crate::schema::FieldType;
use crate::state::{Scalar, StateValue};

/// The shape of a value on either side of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Absent value
    Null,
    String,
    Long,
    Double,
    Boolean,
    Date,
    /// Ordered sequence of scalars
    Array,
    /// Ordered sequence of nested maps
    List,
    /// Nested mapping
    Map,
}

impl Shape {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::String => "string",
            Shape::Long => "long",
            Shape::Double => "double",
            Shape::Boolean => "boolean",
            Shape::Date => "date",
            Shape::Array => "array",
            Shape::List => "list",
            Shape::Map => "map",
        }
    }

    /// Returns true for the scalar shapes
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Shape::String | Shape::Long | Shape::Double | Shape::Boolean | Shape::Date
        )
    }

    /// Shape of a scalar
    pub fn of_scalar(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::String(_) => Shape::String,
            Scalar::Long(_) => Shape::Long,
            Scalar::Double(_) => Shape::Double,
            Scalar::Boolean(_) => Shape::Boolean,
            Scalar::Date(_) => Shape::Date,
        }
    }

    /// Shape of a stored field value
    pub fn of_state(value: &StateValue) -> Self {
        match value {
            StateValue::Null => Shape::Null,
            StateValue::Scalar(s) => Shape::of_scalar(s),
            StateValue::Array(_) => Shape::Array,
            StateValue::List(_) => Shape::List,
            StateValue::State(_) => Shape::Map,
        }
    }

    /// Shape of an externally supplied JSON value
    pub fn of_json(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Boolean,
            Value::Number(n) if n.is_i64() => Shape::Long,
            Value::Number(_) => Shape::Double,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Map,
        }
    }

    /// Canonical shape for a schema type
    pub fn of_type(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::String => Shape::String,
            FieldType::Long => Shape::Long,
            FieldType::Double => Shape::Double,
            FieldType::Boolean => Shape::Boolean,
            FieldType::Date => Shape::Date,
            FieldType::Object { .. } => Shape::Map,
            FieldType::Array { .. } => Shape::Array,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shapes() {
        assert_eq!(Shape::of_json(&json!(null)), Shape::Null);
        assert_eq!(Shape::of_json(&json!(1)), Shape::Long);
        assert_eq!(Shape::of_json(&json!(1.5)), Shape::Double);
        assert_eq!(Shape::of_json(&json!("x")), Shape::String);
        assert_eq!(Shape::of_json(&json!([1])), Shape::Array);
        assert_eq!(Shape::of_json(&json!({})), Shape::Map);
    }

    #[test]
    fn test_type_shapes() {
        assert_eq!(Shape::of_type(&FieldType::Date), Shape::Date);
        assert_eq!(Shape::of_type(&FieldType::array_of(FieldType::Long)), Shape::Array);
        assert!(Shape::Date.is_scalar());
        assert!(!Shape::Map.is_scalar());
    }
}
