//! Client options and the live configuration they merge into.
//!
//! # Design
//! `ServiceOptions` is what a caller supplies, in code or as JSON; every
//! field is optional. `ServiceConfiguration` is the merged result the client
//! owns for its lifetime. The verb builders mutate it (GET records itself,
//! POST/PUT may install a JSON content type), and those mutations are
//! visible to every later call on the same client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::{HttpMethod, ResponseType};

pub type Headers = BTreeMap<String, String>;

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// Options accepted at construction. Absent fields take the defaults:
/// no url, `text`, `GET`, no initial fetch, no headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceOptions {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub response_type: Option<ResponseType>,
    pub method: Option<HttpMethod>,
    pub fetch_on_init: Option<bool>,
    pub headers: Option<Headers>,
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn response_type(mut self, response_type: impl Into<ResponseType>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn fetch_on_init(mut self, fetch: bool) -> Self {
        self.fetch_on_init = Some(fetch);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }
}

/// The configuration a client holds for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfiguration {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub method: HttpMethod,
    pub fetch_on_init: bool,
    pub headers: Option<Headers>,
}

impl Default for ServiceConfiguration {
    fn default() -> Self {
        Self {
            url: None,
            response_type: ResponseType::Text,
            method: HttpMethod::Get,
            fetch_on_init: false,
            headers: None,
        }
    }
}

impl From<ServiceOptions> for ServiceConfiguration {
    fn from(options: ServiceOptions) -> Self {
        let defaults = Self::default();
        Self {
            url: options.url.or(defaults.url),
            response_type: options.response_type.unwrap_or(defaults.response_type),
            method: options.method.unwrap_or(defaults.method),
            fetch_on_init: options.fetch_on_init.unwrap_or(defaults.fetch_on_init),
            headers: options.headers.or(defaults.headers),
        }
    }
}

impl ServiceConfiguration {
    /// Resolve a per-call url against the configured default. An empty
    /// argument counts as absent.
    pub fn resolve_url(&self, url: Option<&str>) -> Option<String> {
        url.filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| self.url.clone())
    }

    /// Record the last GET issued. The response type it used is already the
    /// configured one, so only method and url change.
    pub fn record_get(&mut self, url: Option<String>) {
        self.method = HttpMethod::Get;
        self.url = url;
    }

    /// Install `content-type: application/json` when the client speaks JSON
    /// and has no headers yet. Returns whether anything changed.
    pub fn install_json_content_type(&mut self) -> bool {
        if !self.response_type.is_json() || self.headers.is_some() {
            return false;
        }
        self.headers = Some(Headers::from([(
            CONTENT_TYPE.to_string(),
            APPLICATION_JSON.to_string(),
        )]));
        true
    }
}
