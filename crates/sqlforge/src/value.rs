//! Bound values and type-directed extraction.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::ConversionError;

/// A dialect-neutral value, either bound as a statement parameter or read
/// back from a row cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is the zero value of its type.
    ///
    /// Zero values are `NULL`, `0`, `0.0`, `""`, `false` and the zero
    /// date/time `0001-01-01T00:00:00`. Bytes, UUIDs and JSON documents are
    /// never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::Date(d) => is_zero_date(d),
            Value::DateTime(dt) => is_zero_datetime(dt),
            Value::Timestamp(ts) => is_zero_datetime(&ts.naive_utc()),
            Value::Bytes(_) | Value::Uuid(_) | Value::Json(_) => false,
        }
    }
}

fn is_zero_date(d: &NaiveDate) -> bool {
    d.year() == 1 && d.ordinal() == 1
}

fn is_zero_datetime(dt: &NaiveDateTime) -> bool {
    is_zero_date(&dt.date()) && dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => s.serialize_none(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Int(i) => s.serialize_i64(*i),
            Value::Float(f) => s.serialize_f64(*f),
            Value::Text(t) => s.serialize_str(t),
            // Byte columns are almost always text from drivers that do not decode.
            Value::Bytes(b) => s.serialize_str(&String::from_utf8_lossy(b)),
            Value::Date(d) => d.serialize(s),
            Value::DateTime(dt) => dt.serialize(s),
            Value::Timestamp(ts) => ts.serialize(s),
            Value::Uuid(u) => u.serialize(s),
            Value::Json(j) => j.serialize(s),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => |$v:ident| $e:expr),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from($v: $t) -> Self {
                    $e
                }
            }
        )*
    };
}

value_from! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(i64::from(v)),
    i16 => |v| Value::Int(i64::from(v)),
    i32 => |v| Value::Int(i64::from(v)),
    i64 => |v| Value::Int(v),
    u8 => |v| Value::Int(i64::from(v)),
    u16 => |v| Value::Int(i64::from(v)),
    u32 => |v| Value::Int(i64::from(v)),
    f32 => |v| Value::Float(f64::from(v)),
    f64 => |v| Value::Float(v),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_string()),
    &String => |v| Value::Text(v.clone()),
    Vec<u8> => |v| Value::Bytes(v),
    &[u8] => |v| Value::Bytes(v.to_vec()),
    NaiveDate => |v| Value::Date(v),
    NaiveDateTime => |v| Value::DateTime(v),
    DateTime<Utc> => |v| Value::Timestamp(v),
    Uuid => |v| Value::Uuid(v),
    serde_json::Value => |v| Value::Json(v),
}

macro_rules! value_from_wide {
    ($($t:ty),*) => {
        $(
            /// Values above `i64::MAX` are kept as decimal text.
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Int)
                }
            }
        )*
    };
}

value_from_wide!(u64, usize);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a [`Value`] read off a row into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, ConversionError> {
    Err(ConversionError::new(expected, value.kind()))
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            // SQLite stores booleans as integers.
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            ref other => mismatch("bool", other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(i) => Ok(i),
            ref other => mismatch("i64", other),
        }
    }
}

macro_rules! narrow_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                            ConversionError::new(stringify!($t), format!("out of range integer {i}"))
                        }),
                        ref other => mismatch(stringify!($t), other),
                    }
                }
            }
        )*
    };
}

narrow_int!(i8, i16, i32, u8, u16, u32);

macro_rules! wide_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                            ConversionError::new(stringify!($t), format!("out of range integer {i}"))
                        }),
                        Value::Text(s) => s.parse().map_err(|_| {
                            ConversionError::new(stringify!($t), format!("non-numeric text {s:?}"))
                        }),
                        ref other => mismatch(stringify!($t), other),
                    }
                }
            }
        )*
    };
}

wide_int!(u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            ref other => mismatch("f64", other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => {
                String::from_utf8(b).map_err(|_| ConversionError::new("String", "invalid utf-8"))
            }
            ref other => mismatch("String", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            ref other => mismatch("Vec<u8>", other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            ref other => mismatch("NaiveDate", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Timestamp(ts) => Ok(ts.naive_utc()),
            ref other => mismatch("NaiveDateTime", other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            Value::DateTime(dt) => Ok(dt.and_utc()),
            ref other => mismatch("DateTime<Utc>", other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => {
                Uuid::parse_str(&s).map_err(|e| ConversionError::new("Uuid", e.to_string()))
            }
            ref other => mismatch("Uuid", other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Text(s) => {
                serde_json::from_str(&s).map_err(|e| ConversionError::new("json", e.to_string()))
            }
            ref other => mismatch("json", other),
        }
    }
}
