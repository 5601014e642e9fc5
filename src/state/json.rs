//! JSON rendering of document states
//!
//! Used at the process boundary (CLI session). Dates render as RFC 3339
//! strings and come back as strings; the property model restores their
//! type when a schema is available.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::value::{DocumentState, Scalar, StateValue};

/// Errors converting JSON into a state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateJsonError {
    #[error("Expected a JSON object at '{0}'")]
    NotAnObject(String),

    #[error("Mixed array at '{0}': scalars and objects cannot share an array")]
    MixedArray(String),

    #[error("Nested array at '{0}' is not supported")]
    NestedArray(String),

    #[error("Number at '{0}' is out of range")]
    NumberOutOfRange(String),
}

/// Render a state as a JSON object
pub fn state_to_json(state: &DocumentState) -> Value {
    let mut map = Map::new();
    for (key, value) in state.iter() {
        map.insert(key.clone(), value_to_json(value));
    }
    Value::Object(map)
}

/// Render a single field value as JSON
pub fn value_to_json(value: &StateValue) -> Value {
    match value {
        StateValue::Null => Value::Null,
        StateValue::Scalar(s) => scalar_to_json(s),
        StateValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| item.as_ref().map_or(Value::Null, scalar_to_json))
                .collect(),
        ),
        StateValue::List(items) => Value::Array(items.iter().map(state_to_json).collect()),
        StateValue::State(nested) => state_to_json(nested),
    }
}

/// Render a scalar as JSON
pub fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Long(v) => Value::Number((*v).into()),
        Scalar::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Scalar::Boolean(v) => Value::Bool(*v),
        Scalar::Date(d) => Value::String(d.to_rfc3339()),
    }
}

/// Parse a JSON object into a state
pub fn state_from_json(value: &Value) -> Result<DocumentState, StateJsonError> {
    state_from_json_at(value, "")
}

fn state_from_json_at(value: &Value, path: &str) -> Result<DocumentState, StateJsonError> {
    let object = value
        .as_object()
        .ok_or_else(|| StateJsonError::NotAnObject(display_path(path)))?;

    let mut state = DocumentState::new();
    for (key, field) in object {
        let field_path = format!("{}/{}", path, key);
        state.put(key.clone(), value_from_json(field, &field_path)?);
    }
    Ok(state)
}

fn value_from_json(value: &Value, path: &str) -> Result<StateValue, StateJsonError> {
    match value {
        Value::Null => Ok(StateValue::Null),
        Value::Object(_) => Ok(StateValue::State(state_from_json_at(value, path)?)),
        Value::Array(items) => array_from_json(items, path),
        scalar => Ok(StateValue::Scalar(scalar_from_json(scalar, path)?)),
    }
}

fn array_from_json(items: &[Value], path: &str) -> Result<StateValue, StateJsonError> {
    let objects = items.iter().filter(|v| v.is_object()).count();
    if objects > 0 {
        if objects != items.len() {
            return Err(StateJsonError::MixedArray(path.to_string()));
        }
        let states = items
            .iter()
            .enumerate()
            .map(|(i, v)| state_from_json_at(v, &format!("{}/{}", path, i)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(StateValue::List(states));
    }

    let mut scalars = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Null => scalars.push(None),
            Value::Array(_) => return Err(StateJsonError::NestedArray(path.to_string())),
            other => scalars.push(Some(scalar_from_json(other, path)?)),
        }
    }
    Ok(StateValue::Array(scalars))
}

/// Parse a JSON scalar (string, number, boolean)
pub(crate) fn scalar_from_json(value: &Value, path: &str) -> Result<Scalar, StateJsonError> {
    match value {
        Value::String(s) => Ok(Scalar::String(s.clone())),
        Value::Bool(b) => Ok(Scalar::Boolean(*b)),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Scalar::Long(v))
            } else if let Some(v) = n.as_f64() {
                Ok(Scalar::Double(v))
            } else {
                Err(StateJsonError::NumberOutOfRange(path.to_string()))
            }
        }
        _ => Err(StateJsonError::NotAnObject(display_path(path))),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_document() {
        let value = json!({
            "title": "report",
            "pages": 12,
            "ratio": 0.5,
            "draft": false,
            "tags": ["a", null, "c"],
            "author": { "name": "alice" },
            "files": [{ "name": "a.txt" }, { "name": "b.txt" }]
        });

        let state = state_from_json(&value).unwrap();
        assert_eq!(state.get("title"), Some(&StateValue::from("report")));
        assert_eq!(state.get("pages"), Some(&StateValue::from(12i64)));
        assert_eq!(state.get("ratio"), Some(&StateValue::from(0.5)));
        assert_eq!(
            state.get("tags"),
            Some(&StateValue::Array(vec![
                Some(Scalar::from("a")),
                None,
                Some(Scalar::from("c")),
            ]))
        );
        assert!(matches!(state.get("author"), Some(StateValue::State(_))));
        assert!(matches!(state.get("files"), Some(StateValue::List(l)) if l.len() == 2));

        assert_eq!(state_to_json(&state), value);
    }

    #[test]
    fn test_null_field_kept_for_diffs() {
        let state = state_from_json(&json!({ "title": null })).unwrap();
        assert_eq!(state.get("title"), Some(&StateValue::Null));
    }

    #[test]
    fn test_reject_non_object() {
        let err = state_from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err, StateJsonError::NotAnObject("/".to_string()));
    }

    #[test]
    fn test_reject_mixed_array() {
        let err = state_from_json(&json!({ "x": [1, { "a": 1 }] })).unwrap_err();
        assert_eq!(err, StateJsonError::MixedArray("/x".to_string()));
    }

    #[test]
    fn test_reject_nested_array() {
        let err = state_from_json(&json!({ "x": [[1]] })).unwrap_err();
        assert_eq!(err, StateJsonError::NestedArray("/x".to_string()));
    }
}
