//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `SfClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! `Transport` (or the caller) performs the actual round-trip.
//!
//! Response bodies are bytes because the PDF export returns a binary document.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: base URL, action path and filter segments. `body`, when
/// present, is already form-encoded.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Convenience constructor for textual bodies.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Render filters as the `/key:value` path suffix the service expects in
/// place of a query string.
pub fn filter_suffix<K, V>(filter: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: fmt::Display,
{
    filter
        .iter()
        .map(|(key, value)| format!("/{}:{value}", key.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_suffix_joins_segments_in_order() {
        let suffix = filter_suffix(&[("listinfo", "1"), ("page", "2")]);
        assert_eq!(suffix, "/listinfo:1/page:2");
    }

    #[test]
    fn empty_filter_produces_no_suffix() {
        let filter: [(&str, u32); 0] = [];
        assert_eq!(filter_suffix(&filter), "");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost".to_string(),
            headers: vec![("Authorization".to_string(), "SFAPI x".to_string())],
            body: None,
        };
        assert_eq!(req.header("authorization"), Some("SFAPI x"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn success_range_is_half_open() {
        assert!(HttpResponse::text(200, "").is_success());
        assert!(HttpResponse::text(299, "").is_success());
        assert!(!HttpResponse::text(300, "").is_success());
        assert!(!HttpResponse::text(199, "").is_success());
    }
}
