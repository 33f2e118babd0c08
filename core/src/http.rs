//! Plain data describing one request and its parsed result.
//!
//! # Design
//! A `RequestDescriptor` is built fresh by each verb builder and handed to
//! the lifecycle by value; nothing mutates it afterwards. Bodies and parsed
//! results are small enums rather than generics so hooks, parsers and the
//! last-response cache can all share one concrete type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP method for a request.
///
/// The standard verbs are matched case-insensitively; any other name is
/// kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(value),
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<HttpMethod> for String {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// How a request body is encoded and how its response text is decoded.
///
/// Only `json` changes behaviour. Any other name is kept as given and
/// treated like `text`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseType {
    #[default]
    Text,
    Json,
    Other(String),
}

impl ResponseType {
    pub fn is_json(&self) -> bool {
        matches!(self, ResponseType::Json)
    }
}

impl From<String> for ResponseType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => ResponseType::Text,
            "json" => ResponseType::Json,
            _ => ResponseType::Other(value),
        }
    }
}

impl From<&str> for ResponseType {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<ResponseType> for String {
    fn from(value: ResponseType) -> Self {
        match value {
            ResponseType::Text => "text".to_string(),
            ResponseType::Json => "json".to_string(),
            ResponseType::Other(name) => name,
        }
    }
}

/// A request body: either literal text or a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Json(Value),
}

impl RequestBody {
    /// Encode the body for the wire.
    ///
    /// Under `json` the body is JSON-encoded, so a text body becomes a JSON
    /// string literal. Otherwise text passes through unchanged and a JSON
    /// value is sent as its JSON text.
    pub fn encode(&self, response_type: Option<&ResponseType>) -> Result<String> {
        let json = response_type.is_some_and(ResponseType::is_json);
        match self {
            RequestBody::Text(text) if json => serde_json::to_string(text).map_err(Error::Encode),
            RequestBody::Text(text) => Ok(text.clone()),
            RequestBody::Json(value) => serde_json::to_string(value).map_err(Error::Encode),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Text(value.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Text(value)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// The per-call bundle driving one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: Option<String>,
    /// Absent for DELETE, which therefore never decodes JSON.
    pub response_type: Option<ResponseType>,
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: Option<String>) -> Self {
        Self {
            method,
            url,
            response_type: None,
            body: None,
        }
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    pub fn with_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    /// The body as it goes on the wire, if any.
    pub fn encoded_body(&self) -> Result<Option<String>> {
        self.body
            .as_ref()
            .map(|body| body.encode(self.response_type.as_ref()))
            .transpose()
    }
}

/// A parsed response: raw text, or the decoded JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}
