//! Semi-structured document values
//!
//! A `DocumentState` maps field names to values:
//! - scalars (string, long, double, boolean, date)
//! - homogeneous arrays of scalars, elements may be null
//! - lists of nested states (complex list properties)
//! - nested states (complex properties)
//!
//! The store treats states as opaque; shape is only checked by the
//! property model when a schema is involved.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::keys::{KEY_BLOB_KEYS, KEY_ID};

/// A single scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    /// UTF-8 string
    String(String),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// Boolean
    Boolean(bool),
    /// UTC timestamp
    Date(DateTime<Utc>),
}

impl Scalar {
    /// Returns the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp payload, if this is a date
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Scalar::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Long(_) => "long",
            Scalar::Double(_) => "double",
            Scalar::Boolean(_) => "boolean",
            Scalar::Date(_) => "date",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Boolean(v) => write!(f, "{}", v),
            Scalar::Date(d) => write!(f, "{}", d.to_rfc3339()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Long(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Double(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(d: DateTime<Utc>) -> Self {
        Scalar::Date(d)
    }
}

/// A field value inside a `DocumentState`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StateValue {
    /// Explicit absence. Inside a diff it removes the field; stored
    /// states never keep it.
    Null,
    /// Single scalar
    Scalar(Scalar),
    /// Homogeneous array of scalars
    Array(Vec<Option<Scalar>>),
    /// List of nested states
    List(Vec<DocumentState>),
    /// Nested state
    State(DocumentState),
}

impl StateValue {
    /// Returns true for `StateValue::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    /// Returns the scalar payload, if any
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            StateValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array payload, if any
    pub fn as_array(&self) -> Option<&[Option<Scalar>]> {
        match self {
            StateValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the nested state, if any
    pub fn as_state(&self) -> Option<&DocumentState> {
        match self {
            StateValue::State(s) => Some(s),
            _ => None,
        }
    }

    /// Builds an array value from string items
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StateValue::Array(
            items
                .into_iter()
                .map(|s| Some(Scalar::String(s.into())))
                .collect(),
        )
    }

    /// Whether this value equals `scalar`, or is an array holding it
    pub fn matches(&self, scalar: &Scalar) -> bool {
        match self {
            StateValue::Scalar(s) => s == scalar,
            StateValue::Array(items) => items.iter().flatten().any(|s| s == scalar),
            _ => false,
        }
    }

    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            StateValue::Null => "null",
            StateValue::Scalar(_) => "scalar",
            StateValue::Array(_) => "array",
            StateValue::List(_) => "list",
            StateValue::State(_) => "state",
        }
    }
}

impl From<Scalar> for StateValue {
    fn from(v: Scalar) -> Self {
        StateValue::Scalar(v)
    }
}

macro_rules! state_value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StateValue {
                fn from(v: $ty) -> Self {
                    StateValue::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

state_value_from_scalar!(&str, String, i64, f64, bool, DateTime<Utc>);

/// The semi-structured value held for one document
///
/// Keys are kept ordered so that rendering and iteration are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentState {
    fields: BTreeMap<String, StateValue>,
}

impl DocumentState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state carrying the given document id
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.put(KEY_ID, Scalar::String(id.into()));
        state
    }

    /// Returns the document id stored under the reserved id key
    pub fn id(&self) -> Option<&str> {
        self.get(KEY_ID).and_then(StateValue::as_scalar).and_then(Scalar::as_str)
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.fields.get(key)
    }

    /// Get a mutable field value
    pub fn get_mut(&mut self, key: &str) -> Option<&mut StateValue> {
        self.fields.get_mut(key)
    }

    /// Set a field value
    ///
    /// `Null` is kept as-is so that a diff can carry removals; `merge`
    /// interprets it.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.fields.remove(key)
    }

    /// Returns true if the field is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateValue)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply a partial state on top of this one
    ///
    /// Top-level keys of `diff` replace the current value; `Null`
    /// removes the key.
    pub fn merge(&mut self, diff: &DocumentState) {
        for (key, value) in diff.iter() {
            if value.is_null() {
                self.fields.remove(key);
            } else {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Value at a `/`-separated path through nested states
    pub fn get_path(&self, path: &str) -> Option<&StateValue> {
        let mut segments = path.trim_start_matches('/').split('/');
        let mut value = self.get(segments.next()?)?;
        for segment in segments {
            value = value.as_state()?.get(segment)?;
        }
        Some(value)
    }

    /// Copy of the id plus those of `keys` that are present
    pub fn project<S: AsRef<str>>(&self, keys: &[S]) -> DocumentState {
        let mut projected = DocumentState::new();
        for key in keys.iter().map(|k| k.as_ref()).chain([KEY_ID]) {
            if let Some(value) = self.get(key) {
                projected.put(key, value.clone());
            }
        }
        projected
    }

    /// Drop every top-level `Null` entry
    pub fn strip_nulls(&mut self) {
        self.fields.retain(|_, value| !value.is_null());
    }

    /// Collect referenced binary keys, nested states included
    pub fn blob_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.collect_blob_keys(&mut keys);
        keys
    }

    fn collect_blob_keys(&self, keys: &mut Vec<String>) {
        for (name, value) in &self.fields {
            match value {
                StateValue::Array(items) if name == KEY_BLOB_KEYS => {
                    keys.extend(
                        items
                            .iter()
                            .flatten()
                            .filter_map(Scalar::as_str)
                            .map(str::to_string),
                    );
                }
                StateValue::Scalar(Scalar::String(key)) if name == KEY_BLOB_KEYS => {
                    keys.push(key.clone());
                }
                StateValue::State(nested) => nested.collect_blob_keys(keys),
                StateValue::List(items) => {
                    for nested in items {
                        nested.collect_blob_keys(keys);
                    }
                }
                _ => {}
            }
        }
    }
}

impl FromIterator<(String, StateValue)> for DocumentState {
    fn from_iter<I: IntoIterator<Item = (String, StateValue)>>(iter: I) -> Self {
        let mut state = DocumentState::new();
        for (key, value) in iter {
            state.put(key, value);
        }
        state
    }
}
