//! Schema type definitions
//!
//! The minimal type contract the property model needs:
//! - string, long, double, boolean, date scalars
//! - object: nested fields (complex property)
//! - array: homogeneous array with a scalar element type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::keys::is_reserved;

/// Supported field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// Boolean
    Boolean,
    /// UTC timestamp
    Date,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: BTreeMap<String, FieldType>,
    },
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        #[serde(rename = "element_type")]
        element_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Long => "long",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }

    /// Returns true for the scalar types
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldType::Object { .. } | FieldType::Array { .. })
    }

    /// Array of the given element type
    pub fn array_of(element_type: FieldType) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
        }
    }

    /// Object with the given fields
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        FieldType::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A document type: named set of top-level fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Document type name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions
    pub fields: BTreeMap<String, FieldType>,
}

impl Schema {
    /// Create a new schema
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Look up a top-level field type
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        for (name, field_type) in &self.fields {
            check_field(name, field_type)?;
        }
        Ok(())
    }
}

fn check_field(name: &str, field_type: &FieldType) -> Result<(), String> {
    if name.is_empty() || name.contains('/') {
        return Err(format!("Invalid field name '{}'", name));
    }
    if is_reserved(name) {
        return Err(format!("Field name '{}' uses a reserved prefix", name));
    }
    match field_type {
        FieldType::Array { element_type } if !element_type.is_scalar() => Err(format!(
            "Array field '{}' must have a scalar element type, got {}",
            name,
            element_type.type_name()
        )),
        FieldType::Object { fields } => {
            for (child, child_type) in fields {
                check_field(child, child_type)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
