//! Typed client core for the SuperFaktura invoicing API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values and coerces the service's
//! loosely typed JSON responses into typed records. The network round-trip is
//! pluggable: `SfClient` is pure (host-does-IO), `SfApi` runs the round-trip
//! through a `Transport`.
//!
//! # Design
//! - `format` rewrites request parameter trees into wire form (dates as
//!   `YYYY-MM-DD`, booleans as `"1"`/`"0"`), recursively.
//! - `resource` extracts typed records from response buckets; absent buckets
//!   and absent optional fields become `None`, never errors.
//! - Credentials live in an immutable `ClientConfig` per client, so several
//!   accounts can be used in one process.
//! - Untyped JSON stays inside the crate boundary: public parse results are
//!   structs from `types`.
//!
//! ```no_run
//! use sfapi_core::{ClientConfig, SfApi};
//!
//! let api = SfApi::connect(ClientConfig::from_env()?);
//! let document = api.get_invoice(7)?;
//! if let Some(invoice) = document.invoice {
//!     println!("{} {}", invoice.id, invoice.amount);
//! }
//! # Ok::<(), sfapi_core::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod coerce;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod params;
pub mod resource;
pub mod transport;
pub mod types;
pub mod value_lists;

pub use api::SfApi;
pub use client::SfClient;
pub use config::ClientConfig;
pub use error::{ApiError, CoerceError, Result};
pub use format::format;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::Param;
pub use resource::{parse_resource, parse_resource_list, RawRecord, Resource};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::Transport;
pub use types::{
    Client, CountryDetail, CreateClient, CreateInvoice, CreateInvoiceItem, CreateInvoiceParams, Invoice,
    InvoiceDocument, InvoiceItem, InvoiceList, InvoiceListFilter, SendInvoiceParams,
};
pub use value_lists::{InvoiceType, Language, PaymentType, TimeFilter};
