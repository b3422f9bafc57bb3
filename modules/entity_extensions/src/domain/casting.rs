//! Kind-driven casts between wire values and stored scalars

use crate::contract::{FieldKind, FieldSpec};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value ready to be bound into a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// NULL typed after the column it is bound to
    Null(FieldKind),
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null(_) => Value::Null,
            Scalar::Text(s) => Value::String(s),
            Scalar::Int(i) => Value::from(i),
            Scalar::Bool(b) => Value::Bool(b),
        }
    }
}

/// Value stored for a declared field the caller did not supply
pub fn default_scalar(kind: FieldKind) -> Scalar {
    match kind {
        FieldKind::String | FieldKind::Enum => Scalar::Text(String::new()),
        FieldKind::Integer => Scalar::Int(0),
        FieldKind::Boolean => Scalar::Bool(false),
        FieldKind::Date | FieldKind::DateTime => Scalar::Null(kind),
    }
}

/// Cast a wire value for storage.
///
/// An explicit `null` becomes NULL on nullable fields and the kind default
/// otherwise. `Err` carries the reason when the value does not fit the kind.
pub fn to_storage(field: &FieldSpec, value: &Value) -> Result<Scalar, String> {
    if value.is_null() {
        return Ok(if field.nullable {
            Scalar::Null(field.kind)
        } else {
            default_scalar(field.kind)
        });
    }

    let mismatch = || format!("field '{}' does not accept {}", field.name, value);

    match field.kind {
        FieldKind::String => Ok(Scalar::Text(match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })),
        FieldKind::Integer => as_integer(value).map(Scalar::Int).ok_or_else(mismatch),
        FieldKind::Boolean => as_bool(value).map(Scalar::Bool).ok_or_else(mismatch),
        FieldKind::Enum => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(mismatch()),
            };
            if field.allows(&text) {
                Ok(Scalar::Text(text))
            } else {
                Err(format!("'{}' is not an allowed value of field '{}'", text, field.name))
            }
        }
        FieldKind::Date => match value.as_str().map(str::trim) {
            Some("") => Ok(default_scalar(field.kind)),
            Some(s) => parse_date(s)
                .map(|d| Scalar::Text(d.format(DATE_FORMAT).to_string()))
                .ok_or_else(mismatch),
            None => Err(mismatch()),
        },
        FieldKind::DateTime => match value.as_str().map(str::trim) {
            Some("") => Ok(default_scalar(field.kind)),
            Some(s) => parse_datetime(s)
                .map(|dt| Scalar::Text(dt.format(DATETIME_FORMAT).to_string()))
                .ok_or_else(mismatch),
            None => Err(mismatch()),
        },
    }
}

/// Cast a stored value back to its wire representation
pub fn to_wire(field: &FieldSpec, stored: &Value) -> Value {
    if stored.is_null() {
        return if field.nullable {
            Value::Null
        } else {
            default_scalar(field.kind).into()
        };
    }

    match field.kind {
        FieldKind::String | FieldKind::Enum => match stored {
            Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        },
        FieldKind::Integer => as_integer(stored).map_or(Value::from(0), Value::from),
        FieldKind::Boolean => Value::Bool(as_bool(stored).unwrap_or(false)),
        FieldKind::Date => match stored.as_str() {
            Some(s) => Value::String(
                parse_date(s).map_or_else(|| s.to_string(), |d| d.format(DATE_FORMAT).to_string()),
            ),
            None => stored.clone(),
        },
        FieldKind::DateTime => match stored.as_str() {
            Some(s) => Value::String(
                parse_datetime(s)
                    .map_or_else(|| s.to_string(), |dt| dt.format(DATETIME_FORMAT).to_string()),
            ),
            None => stored.clone(),
        },
    }
}

/// Positive integer id from a JSON number or numeric string
pub fn as_positive_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "on" => Some(true),
            "0" | "false" | "f" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
