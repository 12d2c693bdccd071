//! Address-book clients (the buyers invoices are issued to).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::{RawRecord, Resource};

/// A client record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: i64,
    pub name: Option<String>,
    pub ico: Option<String>,
    pub dic: Option<String>,
    pub ic_dph: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub country_id: Option<i64>,
    pub country_iso_id: Option<String>,
    pub bank_account: Option<String>,
    pub iban: Option<String>,
    pub swift: Option<String>,
    pub comment: Option<String>,
    pub delivery_name: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_zip: Option<String>,
    pub delivery_country: Option<String>,
    pub delivery_country_id: Option<i64>,
    pub delivery_phone: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

impl Resource for Client {
    const KEY: &'static str = "Client";

    fn from_record(r: &RawRecord<'_>) -> Result<Self> {
        Ok(Self {
            id: r.int("id")?,
            name: r.nullable_string("name")?,
            ico: r.nullable_string("ico")?,
            dic: r.nullable_string("dic")?,
            ic_dph: r.nullable_string("ic_dph")?,
            email: r.nullable_string("email")?,
            phone: r.nullable_string("phone")?,
            fax: r.nullable_string("fax")?,
            address: r.nullable_string("address")?,
            city: r.nullable_string("city")?,
            zip: r.nullable_string("zip")?,
            country: r.nullable_string("country")?,
            country_id: r.nullable_int("country_id")?,
            country_iso_id: r.nullable_string("country_iso_id")?,
            bank_account: r.nullable_string("bank_account")?,
            iban: r.nullable_string("iban")?,
            swift: r.nullable_string("swift")?,
            comment: r.nullable_string("comment")?,
            delivery_name: r.nullable_string("delivery_name")?,
            delivery_address: r.nullable_string("delivery_address")?,
            delivery_city: r.nullable_string("delivery_city")?,
            delivery_zip: r.nullable_string("delivery_zip")?,
            delivery_country: r.nullable_string("delivery_country")?,
            delivery_country_id: r.nullable_int("delivery_country_id")?,
            delivery_phone: r.nullable_string("delivery_phone")?,
            created: r.nullable_date("created")?,
            modified: r.nullable_date("modified")?,
        })
    }
}

/// Client data for create requests, either standalone or embedded in an
/// invoice. Only `name` is required by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ico: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ic_dph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_iso_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_country_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_country_iso_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_phone: Option<String>,
    /// Reuse an existing address-book entry with the same address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_address: Option<bool>,
    /// Overwrite the matched address-book entry with these values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_addressbook: Option<bool>,
}
