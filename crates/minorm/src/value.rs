//! Scalar values stored in model fields and carried through SQL rows.

use crate::error::{OrmError, OrmResult};
use crate::field::FieldKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::ser::{Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// UTC instants always carry an explicit offset.
const SQL_DATETIME_UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f+00:00";

/// A type-erased field value.
///
/// Rows fetched from an [`Executor`](crate::Executor) are positional tuples of `Value`s,
/// and every [`Model`](crate::Model) converts its fields to and from this representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL / unset field
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer column
    Int(i64),
    /// Floating point column
    Float(f64),
    /// Text column
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp without time zone
    DateTime(NaiveDateTime),
    /// Timestamp in UTC
    DateTimeUtc(DateTime<Utc>),
}

impl Value {
    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// NULL or an empty string. Non-blank fields must not hold an empty value.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to read this value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render as a literal inside an `INSERT ... VALUES (...)` tuple.
    ///
    /// Strings and temporal values are single-quoted, numbers are emitted as-is and NULL as
    /// `NULL`. Nothing is escaped: values are interpolated into the statement text.
    pub fn sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(_) | Value::Date(_) | Value::DateTime(_) | Value::DateTimeUtc(_) => {
                self.quoted()
            }
        }
    }

    /// Render as `'<value>'`, the form used in WHERE conditions and UPDATE ... SET.
    ///
    /// Every non-null value is quoted regardless of its type; NULL stays bare.
    pub fn quoted(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => format!("'{}'", u8::from(*v)),
            other => format!("'{other}'"),
        }
    }

    /// Convert a decoded JSON scalar into a value.
    pub fn from_json(column: &str, json: &serde_json::Value) -> OrmResult<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| OrmError::decode(column, format!("unsupported number {n}"))),
            },
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            other => Err(OrmError::decode(
                column,
                format!("expected a JSON scalar, got {other}"),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(SQL_DATETIME_FORMAT)),
            Value::DateTimeUtc(dt) => write!(f, "{}", dt.format(SQL_DATETIME_UTC_FORMAT)),
        }
    }
}

/// Dates serialize as ISO-8601 strings instead of failing as non-JSON-native values.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Value::DateTime(dt) => serializer.collect_str(&dt.format(ISO_DATETIME_FORMAT)),
            Value::DateTimeUtc(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float,
    String => Text,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => DateTimeUtc,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion between a Rust field type and [`Value`].
///
/// `#[derive(Model)]` requires every field type to implement this trait. Use `Option<T>`
/// for columns that may be unset.
pub trait FieldValue: Sized {
    /// Column kind reported in the model schema.
    const KIND: FieldKind;
    /// Whether the type can represent NULL.
    const NULLABLE: bool = false;

    /// Convert the current field value to a [`Value`].
    fn to_value(&self) -> Value;

    /// Convert a stored value back into the field type.
    ///
    /// Errors carry a message only; callers attach the column name.
    fn from_value(value: Value) -> Result<Self, String>;
}

fn unexpected(expected: &str, got: &Value) -> String {
    match got {
        Value::Null => format!("expected {expected}, got NULL"),
        other => format!("expected {expected}, got {other:?}"),
    }
}

impl FieldValue for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        value.as_i64().ok_or_else(|| unexpected("integer", &value))
    }
}

impl FieldValue for i32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {wide} out of range for i32"))
    }
}

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::Text(ref s) => s.trim().parse().map_err(|_| unexpected("float", &value)),
            other => Err(unexpected("float", &other)),
        }
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            other => Err(unexpected("boolean", &other)),
        }
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Err(unexpected("text", &Value::Null)),
            other => Ok(other.to_string()),
        }
    }
}

impl FieldValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::DateTimeUtc(dt) => Ok(dt.date_naive()),
            Value::Text(ref s) => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("{e}: {s:?}"))
            }
            other => Err(unexpected("date", &other)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::DateTimeUtc(dt) => Ok(dt.naive_utc()),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Value::Text(ref s) => parse_naive_datetime(s),
            other => Err(unexpected("timestamp", &other)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::DateTimeUtc;

    fn to_value(&self) -> Value {
        Value::DateTimeUtc(*self)
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::DateTimeUtc(dt) => Ok(dt),
            Value::DateTime(dt) => Ok(dt.and_utc()),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN).and_utc()),
            Value::Text(ref s) => match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => Ok(dt.with_timezone(&Utc)),
                Err(_) => parse_naive_datetime(s).map(|dt| dt.and_utc()),
            },
            other => Err(unexpected("timestamptz", &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn parse_naive_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, SQL_DATETIME_FORMAT))
        .or_else(|_| NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|e| format!("{e}: {s:?}"))
}
