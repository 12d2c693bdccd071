//! Invoice records and request payloads.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::resource::{parse_resource, parse_resource_list, RawRecord, Resource};
use crate::types::client::{Client, CreateClient};
use crate::value_lists::{InvoiceType, Language, PaymentType};

/// An invoice as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub accounting_date: NaiveDateTime,
    pub amount: f64,
    pub amount_paid: f64,
    pub client_data: Option<String>,
    pub client_id: i64,
    pub comment: Option<String>,
    pub constant: Option<String>,
    pub country_exchange_rate: f64,
    pub created: NaiveDateTime,
    pub delivery: NaiveDateTime,
    pub delivery_type: Option<String>,
    pub demo: bool,
    pub deposit: f64,
    pub discount: f64,
    pub due: NaiveDateTime,
    pub estimate_id: Option<i64>,
    pub exchange_rate: f64,
    pub flag: Option<String>,
    pub header_comment: Option<String>,
    pub home_currency: Option<String>,
    pub import_id: Option<i64>,
    pub import_parent_id: Option<i64>,
    pub import_type: Option<String>,
    pub internal_comment: Option<String>,
    pub invoice_currency: Option<String>,
    pub invoice_no: i64,
    pub invoice_no_formatted: Option<String>,
    pub invoice_no_formatted_length: i64,
    pub invoice_no_formatted_raw: Option<String>,
    pub issued_by: Option<String>,
    pub issued_by_email: Option<String>,
    pub issued_by_phone: Option<String>,
    pub issued_by_web: Option<String>,
    pub items_data: Option<String>,
    pub items_name: Option<String>,
    pub lang: Option<String>,
    pub mask: Option<String>,
    pub modified: NaiveDateTime,
    /// Free-form account data, delivered as a JSON-encoded string.
    pub my_data: Value,
    pub name: Option<String>,
    pub order_no: Option<String>,
    pub paid: f64,
    pub parent_id: Option<i64>,
    pub paydate: Option<NaiveDateTime>,
    pub payment_type: Option<PaymentType>,
    pub proforma_id: Option<String>,
    pub rounding: Option<String>,
    pub sequence_id: i64,
    pub show_items_with_dph: Option<bool>,
    pub show_special_vat: Option<bool>,
    pub special_vat_scheme: Option<String>,
    pub specific: Option<String>,
    pub status: i64,
    pub summary_invoice: Option<String>,
    pub tags: Option<String>,
    pub tax_document: Option<bool>,
    pub taxdate: Option<NaiveDateTime>,
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub invoice_type: Option<InvoiceType>,
    pub user_id: i64,
    pub user_profile_id: i64,
    pub variable: Option<String>,
    pub variable_raw: Option<String>,
    pub vat: f64,
    pub vat_transfer: Option<bool>,
}

impl Resource for Invoice {
    const KEY: &'static str = "Invoice";

    fn from_record(r: &RawRecord<'_>) -> Result<Self> {
        Ok(Self {
            id: r.int("id")?,
            accounting_date: r.date("accounting_date")?,
            amount: r.float("amount")?,
            amount_paid: r.float("amount_paid")?,
            client_data: r.nullable_string("client_data")?,
            client_id: r.int("client_id")?,
            comment: r.nullable_string("comment")?,
            constant: r.nullable_string("constant")?,
            country_exchange_rate: r.float("country_exchange_rate")?,
            created: r.date("created")?,
            delivery: r.date("delivery")?,
            delivery_type: r.nullable_string("delivery_type")?,
            demo: r.flag("demo"),
            deposit: r.float("deposit")?,
            discount: r.float("discount")?,
            due: r.date("due")?,
            estimate_id: r.nullable_int("estimate_id")?,
            exchange_rate: r.float("exchange_rate")?,
            flag: r.nullable_string("flag")?,
            header_comment: r.nullable_string("header_comment")?,
            home_currency: r.nullable_string("home_currency")?,
            import_id: r.nullable_int("import_id")?,
            import_parent_id: r.nullable_int("import_parent_id")?,
            import_type: r.nullable_string("import_type")?,
            internal_comment: r.nullable_string("internal_comment")?,
            invoice_currency: r.nullable_string("invoice_currency")?,
            invoice_no: r.int("invoice_no")?,
            invoice_no_formatted: r.nullable_string("invoice_no_formatted")?,
            invoice_no_formatted_length: r.int("invoice_no_formatted_length")?,
            invoice_no_formatted_raw: r.nullable_string("invoice_no_formatted_raw")?,
            issued_by: r.nullable_string("issued_by")?,
            issued_by_email: r.nullable_string("issued_by_email")?,
            issued_by_phone: r.nullable_string("issued_by_phone")?,
            issued_by_web: r.nullable_string("issued_by_web")?,
            items_data: r.nullable_string("items_data")?,
            items_name: r.nullable_string("items_name")?,
            lang: r.nullable_string("lang")?,
            mask: r.nullable_string("mask")?,
            modified: r.date("modified")?,
            my_data: r.json("my_data")?,
            name: r.nullable_string("name")?,
            order_no: r.nullable_string("order_no")?,
            paid: r.float("paid")?,
            parent_id: r.nullable_int("parent_id")?,
            paydate: r.nullable_date("paydate")?,
            payment_type: r.nullable_enum("payment_type")?,
            proforma_id: r.nullable_string("proforma_id")?,
            rounding: r.nullable_string("rounding")?,
            sequence_id: r.int("sequence_id")?,
            show_items_with_dph: r.nullable_bool("show_items_with_dph")?,
            show_special_vat: r.nullable_bool("show_special_vat")?,
            special_vat_scheme: r.nullable_string("special_vat_scheme")?,
            specific: r.nullable_string("specific")?,
            status: r.int("status")?,
            summary_invoice: r.nullable_string("summary_invoice")?,
            tags: r.nullable_string("tags")?,
            tax_document: r.nullable_bool("tax_document")?,
            taxdate: r.nullable_date("taxdate")?,
            token: r.nullable_string("token")?,
            invoice_type: r.nullable_enum("type")?,
            user_id: r.int("user_id")?,
            user_profile_id: r.int("user_profile_id")?,
            variable: r.nullable_string("variable")?,
            variable_raw: r.nullable_string("variable_raw")?,
            vat: r.float("vat")?,
            vat_transfer: r.nullable_bool("vat_transfer")?,
        })
    }
}

/// One line of an invoice as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount: f64,
    pub discount_description: Option<String>,
    pub discount_no_vat: f64,
    pub discount_no_vat_total: f64,
    pub discount_with_vat: f64,
    pub discount_with_vat_total: f64,
    pub item_price: f64,
    pub item_price_no_discount: f64,
    pub item_price_vat: f64,
    pub item_price_vat_check: f64,
    pub item_price_vat_no_discount: f64,
    pub ordernum: Option<String>,
    pub quantity: f64,
    pub sku: Option<String>,
    pub stock_item_id: Option<i64>,
    pub tax: f64,
    pub tax_deposit: Option<f64>,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub unit_price_discount: f64,
    pub unit_price_vat: f64,
    pub unit_price_vat_no_discount: f64,
    pub user_id: Option<String>,
    pub user_profile_id: Option<String>,
}

impl Resource for InvoiceItem {
    const KEY: &'static str = "InvoiceItem";

    fn from_record(r: &RawRecord<'_>) -> Result<Self> {
        Ok(Self {
            id: r.int("id")?,
            invoice_id: r.int("invoice_id")?,
            name: r.nullable_string("name")?,
            description: r.nullable_string("description")?,
            discount: r.float("discount")?,
            discount_description: r.nullable_string("discount_description")?,
            discount_no_vat: r.float("discount_no_vat")?,
            discount_no_vat_total: r.float("discount_no_vat_total")?,
            discount_with_vat: r.float("discount_with_vat")?,
            discount_with_vat_total: r.float("discount_with_vat_total")?,
            item_price: r.float("item_price")?,
            item_price_no_discount: r.float("item_price_no_discount")?,
            item_price_vat: r.float("item_price_vat")?,
            item_price_vat_check: r.float("item_price_vat_check")?,
            item_price_vat_no_discount: r.float("item_price_vat_no_discount")?,
            ordernum: r.nullable_string("ordernum")?,
            quantity: r.float("quantity")?,
            sku: r.nullable_string("sku")?,
            stock_item_id: r.nullable_int("stock_item_id")?,
            tax: r.float("tax")?,
            tax_deposit: r.nullable_float("tax_deposit")?,
            unit: r.nullable_string("unit")?,
            unit_price: r.float("unit_price")?,
            unit_price_discount: r.float("unit_price_discount")?,
            unit_price_vat: r.float("unit_price_vat")?,
            unit_price_vat_no_discount: r.float("unit_price_vat_no_discount")?,
            user_id: r.nullable_string("user_id")?,
            user_profile_id: r.nullable_string("user_profile_id")?,
        })
    }
}

/// The buckets of an invoice response. All three are always reported, each
/// `None` when the service left it out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    #[serde(rename = "Client")]
    pub client: Option<Client>,
    #[serde(rename = "Invoice")]
    pub invoice: Option<Invoice>,
    #[serde(rename = "InvoiceItem")]
    pub items: Option<Vec<InvoiceItem>>,
}

impl InvoiceDocument {
    pub fn parse(document: &Value) -> Result<Self> {
        Ok(Self {
            client: parse_resource(document)?,
            invoice: parse_resource(document)?,
            items: parse_resource_list(document)?,
        })
    }
}

/// Paging metadata returned when a list is requested with `listinfo:1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub item_count: i64,
    pub page_count: i64,
    pub per_page: i64,
    pub page: i64,
}

/// One page of invoices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceList {
    pub items: Vec<InvoiceDocument>,
    pub paging: Option<Paging>,
}

impl InvoiceList {
    /// Accepts both the bare array form and the `listinfo` envelope
    /// `{itemCount, pageCount, perPage, page, items}`.
    pub fn parse(document: &Value) -> Result<Self> {
        if let Value::Array(entries) = document {
            return Ok(Self {
                items: entries.iter().map(InvoiceDocument::parse).collect::<Result<_>>()?,
                paging: None,
            });
        }

        let envelope = RawRecord::new("InvoiceList", document)?;
        let paging = Paging {
            item_count: envelope.int("itemCount")?,
            page_count: envelope.int("pageCount")?,
            per_page: envelope.int("perPage")?,
            page: envelope.int("page")?,
        };
        let items = match envelope.get("items") {
            Some(Value::Array(entries)) => entries.iter().map(InvoiceDocument::parse).collect::<Result<_>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            items,
            paging: Some(paging),
        })
    }
}

/// Filters for the invoice list, rendered as `/key:value` segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceListFilter {
    /// Ask for the paging envelope.
    pub listinfo: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub created: Option<crate::value_lists::TimeFilter>,
    pub created_since: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub status: Option<i64>,
    pub client_id: Option<i64>,
    pub invoice_type: Option<InvoiceType>,
}

impl InvoiceListFilter {
    pub fn segments(&self) -> Vec<(&'static str, String)> {
        let mut segments = Vec::new();
        if self.listinfo {
            segments.push(("listinfo", "1".to_string()));
        }
        if let Some(page) = self.page {
            segments.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            segments.push(("per_page", per_page.to_string()));
        }
        if let Some(created) = self.created {
            segments.push(("created", created.code().to_string()));
        }
        if let Some(since) = self.created_since {
            segments.push(("created_since", since.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.created_to {
            segments.push(("created_to", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(status) = self.status {
            segments.push(("status", status.to_string()));
        }
        if let Some(client_id) = self.client_id {
            segments.push(("client_id", client_id.to_string()));
        }
        if let Some(kind) = self.invoice_type {
            segments.push(("type", kind.as_str().to_string()));
        }
        segments
    }
}

/// Bank account printed on an issued invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift: Option<String>,
}

/// Invoice header for a create request. Unset fields are left to the
/// service's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_no_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_by_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_by_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_by_web: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paydate: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proforma_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_document: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub invoice_type: Option<InvoiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_transfer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_rounding_item: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bank_accounts: Vec<BankAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_sent_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_sent_subject: Option<String>,
}

/// Invoice line for a create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_item_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_data_from_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_document_currency: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSetting {
    /// JSON-encoded settings blob, passed through verbatim.
    pub settings: String,
}

/// Payload of the invoice create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceParams {
    #[serde(rename = "Invoice", default)]
    pub invoice: CreateInvoice,
    #[serde(rename = "InvoiceItem", default)]
    pub items: Vec<CreateInvoiceItem>,
    #[serde(rename = "Client", default)]
    pub client: CreateClient,
    #[serde(rename = "InvoiceSetting", default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<InvoiceSetting>,
}

/// Payload of the invoice e-mail call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendInvoiceParams {
    pub invoice_id: i64,
    pub to: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_language: Option<Language>,
}
