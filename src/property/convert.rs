//! Scalar coercions between shapes
//!
//! Lenient in the direction of strings (everything renders), strict
//! otherwise: a string must parse, and numbers only cross between long and
//! double when the value survives the trip exactly.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::state::{scalar_from_json, Scalar};

use super::errors::{PropertyError, PropertyResult};
use super::shape::Shape;

/// Largest magnitude a long can have and still be exact as a double
const MAX_EXACT_DOUBLE_LONG: u64 = 1 << 53;

/// 2^63; `i64::MAX as f64` rounds up to this
const LONG_RANGE_END: f64 = 9_223_372_036_854_775_808.0;

/// Coerce a scalar to the target scalar shape
pub fn coerce_scalar(scalar: &Scalar, target: Shape, path: &str) -> PropertyResult<Scalar> {
    let from = Shape::of_scalar(scalar);
    if from == target {
        return Ok(scalar.clone());
    }
    let fail = || PropertyError::conversion(from, target, path);

    match (scalar, target) {
        (_, Shape::String) => Ok(Scalar::String(scalar.to_string())),
        (Scalar::String(s), Shape::Long) => s.trim().parse().map(Scalar::Long).map_err(|_| fail()),
        (Scalar::String(s), Shape::Double) => {
            s.trim().parse().map(Scalar::Double).map_err(|_| fail())
        }
        (Scalar::String(s), Shape::Boolean) => match s.trim() {
            "true" => Ok(Scalar::Boolean(true)),
            "false" => Ok(Scalar::Boolean(false)),
            _ => Err(fail()),
        },
        (Scalar::String(s), Shape::Date) => DateTime::parse_from_rfc3339(s.trim())
            .map(|d| Scalar::Date(d.with_timezone(&Utc)))
            .map_err(|_| fail()),
        (Scalar::Long(v), Shape::Double) if v.unsigned_abs() <= MAX_EXACT_DOUBLE_LONG => {
            Ok(Scalar::Double(*v as f64))
        }
        (Scalar::Double(v), Shape::Long)
            if v.fract() == 0.0 && *v >= -LONG_RANGE_END && *v < LONG_RANGE_END =>
        {
            Ok(Scalar::Long(*v as i64))
        }
        _ => Err(fail()),
    }
}

/// Coerce an externally supplied JSON scalar to the target scalar shape
///
/// JSON null maps to `None`.
pub fn coerce_json(value: &Value, target: Shape, path: &str) -> PropertyResult<Option<Scalar>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(_) | Value::Object(_) => Err(PropertyError::conversion(
            Shape::of_json(value),
            target,
            path,
        )),
        scalar => {
            let parsed = scalar_from_json(scalar, path)
                .map_err(|_| PropertyError::conversion(Shape::of_json(value), target, path))?;
            coerce_scalar(&parsed, target, path).map(Some)
        }
    }
}
