//! Field coercion from raw attribute text to typed column values
//!
//! Strictness differs by kind:
//!
//! | Kind                | Absent / blank | Unparseable |
//! |---------------------|----------------|-------------|
//! | `Int`               | `0`            | `0`         |
//! | `NullableInt`       | null           | error       |
//! | `Timestamp`         | error          | error       |
//! | `NullableTimestamp` | null           | error       |
//! | `Bool`              | `false`        | `false`     |
//! | `String`            | `""`           | n/a         |
//!
//! Counters that are routinely missing from dumps stay lenient, while
//! references and dates never silently turn into a wrong value.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::decoder::Attributes;

/// Timestamp layout used by dump attributes, e.g. `2009-04-30T07:08:47.383`
///
/// The millisecond fraction is mandatory and exactly three digits long.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    NullableInt,
    Timestamp,
    NullableTimestamp,
    Bool,
    String,
}

/// A coerced column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Timestamp(NaiveDateTime),
    Bool(bool),
    Text(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionFailure {
    #[error("missing required value")]
    Missing,

    #[error("invalid integer '{0}'")]
    InvalidInt(String),

    #[error("invalid timestamp '{0}' (expected YYYY-MM-DDTHH:MM:SS.mmm)")]
    InvalidTimestamp(String),
}

/// A coercion failure tied to the attribute it came from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field {field}: {reason}")]
pub struct CoercionError {
    pub field: &'static str,
    pub reason: CoercionFailure,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn int_or_zero(raw: Option<&str>) -> i64 {
    present(raw).and_then(|s| s.parse().ok()).unwrap_or(0)
}

pub fn nullable_int(raw: Option<&str>) -> Result<Option<i64>, CoercionFailure> {
    match present(raw) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| CoercionFailure::InvalidInt(s.to_string())),
    }
}

pub fn timestamp(raw: Option<&str>) -> Result<NaiveDateTime, CoercionFailure> {
    let s = present(raw).ok_or(CoercionFailure::Missing)?;
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|_| CoercionFailure::InvalidTimestamp(s.to_string()))
}

pub fn nullable_timestamp(raw: Option<&str>) -> Result<Option<NaiveDateTime>, CoercionFailure> {
    match present(raw) {
        None => Ok(None),
        some => timestamp(some).map(Some),
    }
}

pub fn flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| s.trim().eq_ignore_ascii_case("true"))
}

pub fn text(raw: Option<&str>) -> String {
    raw.unwrap_or_default().to_string()
}

/// Convert a raw attribute value according to `kind`
pub fn coerce(raw: Option<&str>, kind: FieldKind) -> Result<Value, CoercionFailure> {
    let value = match kind {
        FieldKind::Int => Value::Int(int_or_zero(raw)),
        FieldKind::NullableInt => nullable_int(raw)?.map_or(Value::Null, Value::Int),
        FieldKind::Timestamp => Value::Timestamp(timestamp(raw)?),
        FieldKind::NullableTimestamp => {
            nullable_timestamp(raw)?.map_or(Value::Null, Value::Timestamp)
        }
        FieldKind::Bool => Value::Bool(flag(raw)),
        FieldKind::String => Value::Text(text(raw)),
    };
    Ok(value)
}

/// Typed, field-named access to a decoded record
pub struct Fields<'a> {
    attributes: &'a Attributes,
}

impl<'a> Fields<'a> {
    pub fn new(attributes: &'a Attributes) -> Self {
        Self { attributes }
    }

    pub fn int_or_zero(&self, field: &'static str) -> i64 {
        int_or_zero(self.attributes.get(field))
    }

    pub fn nullable_int(&self, field: &'static str) -> Result<Option<i64>, CoercionError> {
        nullable_int(self.attributes.get(field)).map_err(|reason| CoercionError { field, reason })
    }

    pub fn timestamp(&self, field: &'static str) -> Result<NaiveDateTime, CoercionError> {
        timestamp(self.attributes.get(field)).map_err(|reason| CoercionError { field, reason })
    }

    pub fn nullable_timestamp(
        &self,
        field: &'static str,
    ) -> Result<Option<NaiveDateTime>, CoercionError> {
        nullable_timestamp(self.attributes.get(field))
            .map_err(|reason| CoercionError { field, reason })
    }

    pub fn flag(&self, field: &'static str) -> bool {
        flag(self.attributes.get(field))
    }

    pub fn text(&self, field: &'static str) -> String {
        text(self.attributes.get(field))
    }
}
