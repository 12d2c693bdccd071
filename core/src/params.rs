//! Request parameter trees.
//!
//! # Design
//! `Param` is the untyped, recursively nested payload a request carries
//! before wire formatting. It is a closed sum type so the formatter can match
//! on every shape, and it never appears in parsed responses.
//!
//! Typed request structs are lowered into a `Param` through their serde
//! representation (`Param::from_serialize`); hand-built trees can use the
//! `From` conversions and `Param::map`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
    Seq(Vec<Param>),
    Map(BTreeMap<String, Param>),
}

impl Param {
    /// Build a mapping from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Param>,
    {
        Param::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Lower any serializable value into a parameter tree.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Param::from)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// Member of a mapping, `None` for any other shape.
    pub fn get(&self, key: &str) -> Option<&Param> {
        match self {
            Param::Map(fields) => fields.get(key),
            _ => None,
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Int(i),
                None => Param::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Param::Str(s),
            Value::Array(items) => Param::Seq(items.into_iter().map(Param::from).collect()),
            Value::Object(fields) => Param::Map(fields.into_iter().map(|(k, v)| (k, Param::from(v))).collect()),
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(value.into())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl From<DateTime<Utc>> for Param {
    fn from(value: DateTime<Utc>) -> Self {
        Param::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Param {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Param::Date(value.with_timezone(&Utc))
    }
}

/// Midnight UTC of the given day.
impl From<NaiveDate> for Param {
    fn from(value: NaiveDate) -> Self {
        Param::Date(value.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(value: Vec<T>) -> Self {
        Param::Seq(value.into_iter().map(Into::into).collect())
    }
}

/// Unformatted dates serialize as ISO-8601 timestamps; run the tree through
/// `format` first to get the wire representation.
impl Serialize for Param {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Param::Null => serializer.serialize_unit(),
            Param::Bool(b) => serializer.serialize_bool(*b),
            Param::Int(i) => serializer.serialize_i64(*i),
            Param::Float(f) => serializer.serialize_f64(*f),
            Param::Str(s) => serializer.serialize_str(s),
            Param::Date(d) => serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Param::Seq(items) => serializer.collect_seq(items),
            Param::Map(fields) => serializer.collect_map(fields),
        }
    }
}
