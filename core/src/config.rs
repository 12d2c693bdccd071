//! Per-client credentials and endpoint.
//!
//! A `ClientConfig` is an immutable value owned by each client, so several
//! accounts can be used side by side in one process.

use std::fmt;

use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Production endpoint of the service.
pub const DEFAULT_BASE_URL: &str = "https://moja.superfaktura.sk";

/// Credentials and endpoint for one API account.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub email: String,
    pub api_key: String,
    /// Free-form identifier of the integrating application.
    pub module: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
            module: module.into(),
            company_id: None,
            base_url: default_base_url(),
        }
    }

    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the configuration from `SFAPI_EMAIL`, `SFAPI_KEY`, `SFAPI_MODULE`
    /// and the optional `SFAPI_COMPANY_ID` / `SFAPI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::Config(name.to_string()))
        };

        let mut config = Self::new(required("SFAPI_EMAIL")?, required("SFAPI_KEY")?, required("SFAPI_MODULE")?);
        if let Some(company_id) = lookup("SFAPI_COMPANY_ID").filter(|v| !v.is_empty()) {
            config = config.with_company_id(company_id);
        }
        if let Some(base_url) = lookup("SFAPI_BASE_URL").filter(|v| !v.is_empty()) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Value of the `Authorization` header. The format is fixed by the
    /// service and must not be re-encoded.
    pub fn auth_header(&self) -> String {
        let mut header = format!(
            "SFAPI email={}&apikey={}&module={}",
            self.email, self.api_key, self.module
        );
        if let Some(company_id) = self.company_id.as_deref().filter(|id| !id.is_empty()) {
            header.push_str("&company=");
            header.push_str(company_id);
        }
        header
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .field("module", &self.module)
            .field("company_id", &self.company_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn auth_header_without_company() {
        let config = ClientConfig::new("me@example.com", "k3y", "rust-client");
        assert_eq!(
            config.auth_header(),
            "SFAPI email=me@example.com&apikey=k3y&module=rust-client"
        );
    }

    #[test]
    fn auth_header_with_company() {
        let config = ClientConfig::new("me@example.com", "k3y", "rust-client").with_company_id("42");
        assert_eq!(
            config.auth_header(),
            "SFAPI email=me@example.com&apikey=k3y&module=rust-client&company=42"
        );
    }

    #[test]
    fn empty_company_is_omitted() {
        let config = ClientConfig::new("a", "b", "c").with_company_id("");
        assert_eq!(config.auth_header(), "SFAPI email=a&apikey=b&module=c");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ClientConfig::new("a", "very-secret", "c");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SFAPI_EMAIL", "me@example.com"),
            ("SFAPI_KEY", "k3y"),
            ("SFAPI_MODULE", "tests"),
            ("SFAPI_COMPANY_ID", "7"),
            ("SFAPI_BASE_URL", "https://sandbox.example.com"),
        ]);
        let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.email, "me@example.com");
        assert_eq!(config.company_id.as_deref(), Some("7"));
        assert_eq!(config.base_url, "https://sandbox.example.com");
    }

    #[test]
    fn from_lookup_defaults_base_url() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("SFAPI_EMAIL", "a"), ("SFAPI_KEY", "b"), ("SFAPI_MODULE", "c")]);
        let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.company_id.is_none());
    }

    #[test]
    fn from_lookup_reports_missing_key() {
        let err = ClientConfig::from_lookup(|name| (name == "SFAPI_EMAIL").then(|| "a".to_string())).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref name) if name == "SFAPI_KEY"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"email":"a","api_key":"b","module":"c"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.company_id.is_none());
    }
}
