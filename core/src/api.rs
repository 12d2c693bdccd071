//! One-call operations: build, execute, parse.
//!
//! `SfApi` pairs an `SfClient` with a `Transport`. Each method performs
//! exactly one round-trip and surfaces every failure to the caller; nothing is
//! retried.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::client::SfClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::Param;
use crate::transport::Transport;
use crate::types::country::find_country_by_name;
use crate::types::{
    Client, CountryDetail, CreateClient, CreateInvoiceParams, InvoiceDocument, InvoiceList, InvoiceListFilter,
    SendInvoiceParams,
};
use crate::value_lists::Language;

#[cfg(feature = "ureq")]
use crate::transport::UreqTransport;

#[derive(Debug, Clone)]
pub struct SfApi<T> {
    client: SfClient,
    transport: T,
}

#[cfg(feature = "ureq")]
impl SfApi<UreqTransport> {
    /// Client over the default blocking HTTP transport.
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(SfClient::new(config), UreqTransport::new())
    }
}

impl<T: Transport> SfApi<T> {
    pub fn new(client: SfClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &SfClient {
        &self.client
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// Send an arbitrary action and return the decoded JSON body.
    pub fn send(
        &self,
        action: &str,
        method: HttpMethod,
        body: Option<&Param>,
        filter: &[(&str, String)],
    ) -> Result<Value> {
        let request = self.client.build_request(method, action, body, filter)?;
        self.client.parse_response(self.execute(request)?)
    }

    pub fn create_invoice(&self, params: &CreateInvoiceParams) -> Result<Option<InvoiceDocument>> {
        let request = self.client.build_create_invoice(params)?;
        self.client.parse_create_invoice(self.execute(request)?)
    }

    pub fn get_invoice(&self, id: i64) -> Result<InvoiceDocument> {
        let request = self.client.build_get_invoice(id);
        self.client.parse_get_invoice(self.execute(request)?)
    }

    pub fn list_invoices(&self, filter: &InvoiceListFilter) -> Result<InvoiceList> {
        let request = self.client.build_list_invoices(filter);
        self.client.parse_list_invoices(self.execute(request)?)
    }

    pub fn send_invoice_email(&self, params: &SendInvoiceParams) -> Result<Option<InvoiceDocument>> {
        let request = self.client.build_send_invoice_email(params)?;
        self.client.parse_send_invoice_email(self.execute(request)?)
    }

    pub fn invoice_pdf(&self, id: i64, token: &str, language: Language) -> Result<Vec<u8>> {
        let request = self.client.build_invoice_pdf(id, token, language);
        self.client.parse_invoice_pdf(self.execute(request)?)
    }

    pub fn create_client(&self, client: &CreateClient) -> Result<Option<Client>> {
        let request = self.client.build_create_client(client)?;
        self.client.parse_create_client(self.execute(request)?)
    }

    pub fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let request = self.client.build_get_client(id);
        self.client.parse_get_client(self.execute(request)?)
    }

    pub fn list_countries(&self) -> Result<BTreeMap<String, String>> {
        let request = self.client.build_list_countries();
        self.client.parse_list_countries(self.execute(request)?)
    }

    pub fn list_countries_detailed(&self) -> Result<Vec<CountryDetail>> {
        let request = self.client.build_list_countries_detailed();
        self.client.parse_list_countries_detailed(self.execute(request)?)
    }

    pub fn country_by_name(&self, name: &str) -> Result<Option<CountryDetail>> {
        Ok(find_country_by_name(self.list_countries_detailed()?, name))
    }
}
