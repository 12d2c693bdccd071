//! Extraction of typed records from raw response documents.
//!
//! # Design
//! A response document maps bucket names (`"Invoice"`, `"Client"`,
//! `"InvoiceItem"`) to a record or a list of records. Each typed record
//! implements [`Resource`], naming its bucket and reading its fields through a
//! [`RawRecord`], whose accessors bind a field name to one of the coercions in
//! [`crate::coerce`] and attach the resource/field to any failure.
//!
//! A missing bucket is not an error: the service omits buckets it has nothing
//! to say about, so `parse_resource` returns `Ok(None)`.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::coerce;
use crate::error::{ApiError, CoerceError, Result};

/// A typed record read from one bucket of a response document.
pub trait Resource: Sized {
    /// Bucket name in the response document.
    const KEY: &'static str;

    fn from_record(record: &RawRecord<'_>) -> Result<Self>;
}

/// Read-only view over one raw record.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    resource: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> RawRecord<'a> {
    pub fn new(resource: &'a str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { resource, fields }),
            other => Err(coercion(resource, "", CoerceError::NotRecord(kind(other).to_string()))),
        }
    }

    pub fn resource(&self) -> &str {
        self.resource
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field)
    }

    fn wrap<T>(&self, field: &str, result: std::result::Result<T, CoerceError>) -> Result<T> {
        result.map_err(|source| coercion(self.resource, field, source))
    }

    fn required<T>(&self, field: &str, f: fn(&Value) -> std::result::Result<T, CoerceError>) -> Result<T> {
        let result = match self.get(field) {
            None | Some(Value::Null) => Err(CoerceError::Missing),
            Some(value) => f(value),
        };
        self.wrap(field, result)
    }

    pub fn int(&self, field: &str) -> Result<i64> {
        self.required(field, coerce::int)
    }

    pub fn float(&self, field: &str) -> Result<f64> {
        self.required(field, coerce::float)
    }

    pub fn string(&self, field: &str) -> Result<String> {
        self.required(field, coerce::string)
    }

    pub fn date(&self, field: &str) -> Result<NaiveDateTime> {
        self.required(field, coerce::date)
    }

    pub fn json(&self, field: &str) -> Result<Value> {
        self.required(field, coerce::json)
    }

    /// `"1"` is true; anything else, absence included, is false.
    pub fn flag(&self, field: &str) -> bool {
        coerce::flag(self.get(field))
    }

    pub fn nullable_int(&self, field: &str) -> Result<Option<i64>> {
        self.wrap(field, coerce::nullable_int(self.get(field)))
    }

    pub fn nullable_float(&self, field: &str) -> Result<Option<f64>> {
        self.wrap(field, coerce::nullable_float(self.get(field)))
    }

    pub fn nullable_string(&self, field: &str) -> Result<Option<String>> {
        self.wrap(field, coerce::nullable_string(self.get(field)))
    }

    pub fn nullable_date(&self, field: &str) -> Result<Option<NaiveDateTime>> {
        self.wrap(field, coerce::nullable_date(self.get(field)))
    }

    pub fn nullable_bool(&self, field: &str) -> Result<Option<bool>> {
        self.wrap(field, coerce::nullable_bool(self.get(field)))
    }

    /// Nullable value deserialized through serde, used for the service's
    /// enumerated string fields. Empty strings count as absent.
    pub fn nullable_enum<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>> {
        let result = coerce::nullable(self.get(field), |value| match value {
            Value::String(s) if s.is_empty() => Ok(None),
            other => serde_json::from_value(other.clone())
                .map(Some)
                .map_err(|e| CoerceError::Str(e.to_string())),
        });
        self.wrap(field, result).map(Option::flatten)
    }
}

fn coercion(resource: &str, field: &str, source: CoerceError) -> ApiError {
    ApiError::Coercion {
        resource: resource.to_string(),
        field: field.to_string(),
        source,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Loose truthiness of a bucket: `null`, `false`, `""` and zero are treated
/// as "not present". Empty arrays and objects count as present.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn bucket<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    document.get(key).filter(|value| !is_falsy(value))
}

/// Coerce the single record stored under `R::KEY`, or `None` when the bucket
/// is absent.
pub fn parse_resource<R: Resource>(document: &Value) -> Result<Option<R>> {
    let Some(raw) = bucket(document, R::KEY) else {
        tracing::trace!(resource = R::KEY, "resource bucket absent");
        return Ok(None);
    };
    let record = RawRecord::new(R::KEY, raw)?;
    R::from_record(&record).map(Some)
}

/// Coerce every record stored under `R::KEY`, preserving order, or `None`
/// when the bucket is absent.
pub fn parse_resource_list<R: Resource>(document: &Value) -> Result<Option<Vec<R>>> {
    let Some(raw) = bucket(document, R::KEY) else {
        tracing::trace!(resource = R::KEY, "resource list absent");
        return Ok(None);
    };
    let Value::Array(items) = raw else {
        return Err(coercion(R::KEY, "", CoerceError::NotList(kind(raw).to_string())));
    };
    items
        .iter()
        .map(|item| RawRecord::new(R::KEY, item).and_then(|record| R::from_record(&record)))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
