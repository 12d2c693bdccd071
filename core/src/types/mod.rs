//! Typed records and request payloads for the invoicing API.
//!
//! # Design
//! Response records are built only through [`crate::resource::Resource`], so
//! every field passes its declared coercion. Request payloads are plain serde
//! structs; `SfClient` lowers them into a parameter tree and formats that for
//! the wire, which is where booleans and dates get their wire encoding.

pub mod client;
pub mod country;
pub mod invoice;

pub use client::{Client, CreateClient};
pub use country::CountryDetail;
pub use invoice::{
    BankAccount, CreateInvoice, CreateInvoiceItem, CreateInvoiceParams, Invoice, InvoiceDocument, InvoiceItem,
    InvoiceList, InvoiceListFilter, InvoiceSetting, Paging, SendInvoiceParams,
};
