//! Country reference data.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::coerce;
use crate::error::{ApiError, Result};
use crate::resource::{parse_resource, RawRecord, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryDetail {
    pub id: i64,
    pub name: String,
    pub iso: Option<String>,
    /// Member of the European Union.
    pub eu: bool,
}

impl Resource for CountryDetail {
    const KEY: &'static str = "Country";

    fn from_record(r: &RawRecord<'_>) -> Result<Self> {
        Ok(Self {
            id: r.int("id")?,
            name: r.string("name")?,
            iso: r.nullable_string("iso")?,
            eu: r.flag("eu"),
        })
    }
}

/// Brief country list: id → display name.
pub fn parse_country_names(document: &Value) -> Result<BTreeMap<String, String>> {
    let Value::Object(entries) = document else {
        return Err(ApiError::Deserialization(format!(
            "expected an object of country names, got {document}"
        )));
    };
    entries
        .iter()
        .map(|(id, name)| {
            coerce::string(name)
                .map(|name| (id.clone(), name))
                .map_err(|source| ApiError::Coercion {
                    resource: "Country".to_string(),
                    field: id.clone(),
                    source,
                })
        })
        .collect()
}

/// Detailed country list: `[{"Country": {...}}, ...]`. Entries without a
/// `Country` bucket are skipped.
pub fn parse_country_details(document: &Value) -> Result<Vec<CountryDetail>> {
    let Value::Array(entries) = document else {
        return Err(ApiError::Deserialization(format!(
            "expected a list of countries, got {document}"
        )));
    };
    let mut countries = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(country) = parse_resource::<CountryDetail>(entry)? {
            countries.push(country);
        }
    }
    Ok(countries)
}

/// First country whose name matches exactly.
pub fn find_country_by_name(countries: Vec<CountryDetail>, name: &str) -> Option<CountryDetail> {
    countries.into_iter().find(|country| country.name == name)
}
