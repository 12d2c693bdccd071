//! Stateless HTTP request builder and response parser for the invoicing API.
//!
//! # Design
//! `SfClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The round-trip itself is executed by a `Transport` (see
//! `SfApi`) or by the caller, keeping this type deterministic and free of I/O.
//!
//! Every request carries the `SFAPI` authorization header. Payloads are
//! lowered into a `Param` tree, formatted for the wire and sent as the single
//! form field `data`. Filters become `/key:value` path segments.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::Value;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::format::format;
use crate::http::{filter_suffix, HttpMethod, HttpRequest, HttpResponse};
use crate::params::Param;
use crate::resource::{is_falsy, parse_resource};
use crate::types::country::{parse_country_details, parse_country_names};
use crate::types::{
    Client, CountryDetail, CreateClient, CreateInvoiceParams, InvoiceDocument, InvoiceList, InvoiceListFilter,
    SendInvoiceParams,
};
use crate::value_lists::Language;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Synchronous, stateless client for the invoicing API.
#[derive(Debug, Clone)]
pub struct SfClient {
    config: ClientConfig,
}

impl SfClient {
    pub fn new(mut config: ClientConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL, action path and filter segments.
    pub fn request_url<K, V>(&self, action: &str, filter: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: Display,
    {
        format!("{}{action}{}", self.config.base_url, filter_suffix(filter))
    }

    /// Build an authenticated request for any action. `body` is formatted and
    /// form-encoded as the `data` field.
    pub fn build_request<K, V>(
        &self,
        method: HttpMethod,
        action: &str,
        body: Option<&Param>,
        filter: &[(K, V)],
    ) -> Result<HttpRequest>
    where
        K: AsRef<str>,
        V: Display,
    {
        let body = body.map(encode_body).transpose()?;
        Ok(HttpRequest {
            method,
            url: self.request_url(action, filter),
            headers: self.headers(),
            body,
        })
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), self.config.auth_header()),
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ]
    }

    fn get(&self, action: &str, filter: &[(&str, String)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.request_url(action, filter),
            headers: self.headers(),
            body: None,
        }
    }

    fn post<T: serde::Serialize + ?Sized>(&self, action: &str, payload: &T) -> Result<HttpRequest> {
        let body = Param::from_serialize(payload)?;
        self.build_request::<&str, String>(HttpMethod::Post, action, Some(&body), &[])
    }

    /// Decode a JSON response, failing on a status outside `[200, 300)` or a
    /// positive `error` flag in the body.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        let decoded: Option<Value> = serde_json::from_slice(&response.body).ok();
        if let Some(err) = api_error(&response, decoded.as_ref()) {
            return Err(err);
        }
        decoded.ok_or_else(|| {
            ApiError::Deserialization(format!(
                "response body is not JSON: {}",
                String::from_utf8_lossy(&response.body)
            ))
        })
    }

    // -- invoices -----------------------------------------------------------

    pub fn build_create_invoice(&self, params: &CreateInvoiceParams) -> Result<HttpRequest> {
        self.post("/invoices/create", params)
    }

    /// `None` when the service acknowledged the call without returning data.
    pub fn parse_create_invoice(&self, response: HttpResponse) -> Result<Option<InvoiceDocument>> {
        let document = self.parse_response(response)?;
        data_member(&document).map(InvoiceDocument::parse).transpose()
    }

    pub fn build_get_invoice(&self, id: i64) -> HttpRequest {
        self.get(&format!("/invoices/view/{id}.json"), &[])
    }

    pub fn parse_get_invoice(&self, response: HttpResponse) -> Result<InvoiceDocument> {
        InvoiceDocument::parse(&self.parse_response(response)?)
    }

    pub fn build_list_invoices(&self, filter: &InvoiceListFilter) -> HttpRequest {
        self.get("/invoices/index.json", &filter.segments())
    }

    pub fn parse_list_invoices(&self, response: HttpResponse) -> Result<InvoiceList> {
        InvoiceList::parse(&self.parse_response(response)?)
    }

    pub fn build_send_invoice_email(&self, params: &SendInvoiceParams) -> Result<HttpRequest> {
        self.post("/invoices/send", &BTreeMap::from([("Email", params)]))
    }

    pub fn parse_send_invoice_email(&self, response: HttpResponse) -> Result<Option<InvoiceDocument>> {
        let document = self.parse_response(response)?;
        data_member(&document).map(InvoiceDocument::parse).transpose()
    }

    /// PDF export; `token` is the invoice's access token.
    pub fn build_invoice_pdf(&self, id: i64, token: &str, language: Language) -> HttpRequest {
        self.get(
            &format!("/{}/invoices/pdf/{id}", language.code()),
            &[("token", token.to_string())],
        )
    }

    /// Raw PDF bytes. A JSON body with a positive `error` flag is still an
    /// error even with a 2xx status.
    pub fn parse_invoice_pdf(&self, response: HttpResponse) -> Result<Vec<u8>> {
        let decoded: Option<Value> = serde_json::from_slice(&response.body).ok();
        if let Some(err) = api_error(&response, decoded.as_ref()) {
            return Err(err);
        }
        Ok(response.body)
    }

    // -- clients ------------------------------------------------------------

    pub fn build_create_client(&self, client: &CreateClient) -> Result<HttpRequest> {
        self.post("/clients/create", &BTreeMap::from([("Client", client)]))
    }

    pub fn parse_create_client(&self, response: HttpResponse) -> Result<Option<Client>> {
        let document = self.parse_response(response)?;
        match data_member(&document) {
            Some(data) => parse_resource(data),
            None => Ok(None),
        }
    }

    pub fn build_get_client(&self, id: i64) -> HttpRequest {
        self.get(&format!("/clients/view/{id}"), &[])
    }

    pub fn parse_get_client(&self, response: HttpResponse) -> Result<Option<Client>> {
        parse_resource(&self.parse_response(response)?)
    }

    // -- countries ----------------------------------------------------------

    pub fn build_list_countries(&self) -> HttpRequest {
        self.get("/countries", &[])
    }

    pub fn parse_list_countries(&self, response: HttpResponse) -> Result<BTreeMap<String, String>> {
        parse_country_names(&self.parse_response(response)?)
    }

    pub fn build_list_countries_detailed(&self) -> HttpRequest {
        self.get("/countries/index", &[("view_full", "1".to_string())])
    }

    pub fn parse_list_countries_detailed(&self, response: HttpResponse) -> Result<Vec<CountryDetail>> {
        parse_country_details(&self.parse_response(response)?)
    }
}

fn encode_body(body: &Param) -> Result<String> {
    let json = serde_json::to_string(&format(body)).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", &json)
        .finish())
}

/// The `data` member of a write acknowledgement. Falsy values and the empty
/// array the service sends for an empty payload mean "no data".
fn data_member(document: &Value) -> Option<&Value> {
    document
        .get("data")
        .filter(|data| !is_falsy(data) && !matches!(data, Value::Array(items) if items.is_empty()))
}

fn error_flag_set(flag: &Value) -> bool {
    match flag {
        Value::Number(n) => n.as_f64().is_some_and(|n| n > 0.0),
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(|n| n > 0.0),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Map a failed response to `ApiError::Api`. The message comes from the
/// body's `error_message` when present, else from the status reason.
fn api_error(response: &HttpResponse, body: Option<&Value>) -> Option<ApiError> {
    let flagged = body.and_then(|b| b.get("error")).is_some_and(error_flag_set);
    if response.is_success() && !flagged {
        return None;
    }

    let status = response.status;

    let message = body
        .and_then(|b| b.get("error_message"))
        .filter(|m| !m.is_null())
        .map(|m| match m {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| {
            ::http::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("unexpected response")
                .to_string()
        });
    warn!(status, %message, "request rejected by the service");
    Some(ApiError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::CreateInvoice;

    fn client() -> SfClient {
        SfClient::new(ClientConfig::new("me@example.com", "k3y", "tests").with_base_url("http://localhost:3000"))
    }

    fn decoded_data(req: &HttpRequest) -> Value {
        let body = req.body.as_deref().unwrap();
        let (key, value) = url::form_urlencoded::parse(body.as_bytes()).next().unwrap();
        assert_eq!(key, "data");
        serde_json::from_str(&value).unwrap()
    }

    #[test]
    fn every_request_is_authenticated() {
        let req = client().build_get_invoice(7);
        assert_eq!(
            req.header("Authorization"),
            Some("SFAPI email=me@example.com&apikey=k3y&module=tests")
        );
        assert_eq!(req.header("Content-Type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn build_get_invoice_produces_correct_request() {
        let req = client().build_get_invoice(7);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/invoices/view/7.json");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_appends_filter_segments() {
        let req = client()
            .build_request(HttpMethod::Get, "/invoices/index.json", None, &[("page", 2), ("per_page", 5)])
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/invoices/index.json/page:2/per_page:5");
    }

    #[test]
    fn build_request_form_encodes_formatted_body() {
        let body = Param::map([("paid", Param::Bool(true)), ("note", Param::from("a&b=c"))]);
        let req = client()
            .build_request::<&str, String>(HttpMethod::Post, "/x", Some(&body), &[])
            .unwrap();
        let raw = req.body.as_deref().unwrap();
        assert!(raw.starts_with("data="));
        assert!(!raw.contains("a&b"));
        assert_eq!(decoded_data(&req), json!({"note": "a&b=c", "paid": "1"}));
    }

    #[test]
    fn build_create_invoice_wraps_buckets() {
        let params = CreateInvoiceParams {
            invoice: CreateInvoice {
                name: Some("Test".to_string()),
                ..Default::default()
            },
            client: CreateClient {
                name: Some("Acme".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let req = client().build_create_invoice(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/invoices/create");
        let data = decoded_data(&req);
        assert_eq!(data["Invoice"]["name"], "Test");
        assert_eq!(data["Client"]["name"], "Acme");
        assert_eq!(data["InvoiceItem"], json!([]));
    }

    #[test]
    fn build_send_invoice_email_wraps_email_bucket() {
        let params = SendInvoiceParams {
            invoice_id: 7,
            to: "buyer@example.com".to_string(),
            ..Default::default()
        };
        let req = client().build_send_invoice_email(&params).unwrap();
        assert_eq!(req.url, "http://localhost:3000/invoices/send");
        assert_eq!(decoded_data(&req), json!({"Email": {"invoice_id": 7, "to": "buyer@example.com"}}));
    }

    #[test]
    fn build_invoice_pdf_uses_token_segment() {
        let req = client().build_invoice_pdf(7, "abc123", Language::Slovak);
        assert_eq!(req.url, "http://localhost:3000/slo/invoices/pdf/7/token:abc123");
    }

    #[test]
    fn build_countries_requests() {
        assert_eq!(client().build_list_countries().url, "http://localhost:3000/countries");
        assert_eq!(
            client().build_list_countries_detailed().url,
            "http://localhost:3000/countries/index/view_full:1"
        );
    }

    #[test]
    fn build_client_requests() {
        assert_eq!(client().build_get_client(15).url, "http://localhost:3000/clients/view/15");
        let req = client()
            .build_create_client(&CreateClient {
                name: Some("Acme".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(decoded_data(&req), json!({"Client": {"name": "Acme"}}));
    }

    #[test]
    fn server_error_carries_status() {
        let err = client()
            .parse_get_invoice(HttpResponse::text(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 500, .. }));
        assert_eq!(err.to_string(), "API error (HTTP 500): Internal Server Error");
    }

    #[test]
    fn error_flag_in_successful_response_fails() {
        let response = HttpResponse::text(200, r#"{"error":1,"error_message":"Invalid client name"}"#);
        let err = client().parse_create_client(response).unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Invalid client name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_error_flag_is_success() {
        let response = HttpResponse::text(200, r#"{"error":0,"data":null}"#);
        assert_eq!(client().parse_create_invoice(response).unwrap(), None);
    }

    #[test]
    fn falsy_data_member_is_absent() {
        for data in ["false", r#""""#, "0", "[]"] {
            let body = format!(r#"{{"error":0,"data":{data}}}"#);
            assert_eq!(client().parse_create_invoice(HttpResponse::text(200, body.clone())).unwrap(), None);
            assert_eq!(client().parse_send_invoice_email(HttpResponse::text(200, body.clone())).unwrap(), None);
            assert_eq!(client().parse_create_client(HttpResponse::text(200, body)).unwrap(), None);
        }
    }

    #[test]
    fn redirect_status_is_an_error() {
        let response = HttpResponse::text(302, r#"{"error":0}"#);
        let err = client().parse_response(response).unwrap_err();
        assert_eq!(err.status(), Some(302));
        assert_eq!(err.to_string(), "API error (HTTP 302): Found");
    }

    #[test]
    fn string_error_flag_is_honored() {
        let response = HttpResponse::text(200, r#"{"error":"1","error_message":{"name":"required"}}"#);
        let err = client().parse_response(response).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn non_json_success_is_a_deserialization_error() {
        let err = client().parse_response(HttpResponse::text(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_get_client_without_bucket() {
        let response = HttpResponse::text(200, r#"{"ClientStat":{}}"#);
        assert_eq!(client().parse_get_client(response).unwrap(), None);
    }

    #[test]
    fn parse_create_client_reads_data_member() {
        let response = HttpResponse::text(200, r#"{"error":0,"data":{"Client":{"id":"15","name":"Acme"}}}"#);
        let created = client().parse_create_client(response).unwrap().unwrap();
        assert_eq!(created.id, 15);
    }

    #[test]
    fn parse_invoice_pdf_passes_bytes_through() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/pdf".to_string())],
            body: b"%PDF-1.4 fake".to_vec(),
        };
        assert_eq!(client().parse_invoice_pdf(response).unwrap(), b"%PDF-1.4 fake");
    }

    #[test]
    fn parse_invoice_pdf_detects_error_body() {
        let response = HttpResponse::text(200, r#"{"error":1,"error_message":"Wrong token"}"#);
        let err = client().parse_invoice_pdf(response).unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 200, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = SfClient::new(ClientConfig::new("a", "b", "c").with_base_url("http://localhost:3000//"));
        assert_eq!(client.build_list_countries().url, "http://localhost:3000/countries");
    }
}
