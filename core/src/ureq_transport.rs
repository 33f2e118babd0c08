//! `Transport` backed by a blocking `ureq` agent.
//!
//! # Design
//! `send` moves the blocking round-trip onto tokio's blocking pool and
//! returns at once; `completion` awaits that task. Status codes are data
//! here (`http_status_as_error(false)`), the lifecycle decides what counts
//! as failure. Anything that prevents a response from arriving becomes the
//! error event with status 0 and an empty status text. Once a response has
//! arrived its body is read as bytes and decoded lossily, so an unreadable
//! encoding never turns a load into an error event.

use async_trait::async_trait;
use thiserror::Error as ThisError;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::transport::{Completion, Connector, Transport};

/// Hands out `UreqTransport`s sharing one agent.
#[derive(Clone)]
pub struct UreqConnector {
    agent: ureq::Agent,
}

impl UreqConnector {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for UreqConnector {
    fn connect(&self) -> Box<dyn Transport> {
        Box::new(UreqTransport::new(self.agent.clone()))
    }
}

#[derive(Debug)]
struct Prepared {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
}

#[derive(Debug)]
struct Received {
    status: u16,
    status_text: String,
    text: String,
}

pub struct UreqTransport {
    agent: ureq::Agent,
    prepared: Option<Prepared>,
    task: Option<JoinHandle<std::result::Result<Received, ExchangeError>>>,
    received: Option<Received>,
}

impl UreqTransport {
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            prepared: None,
            task: None,
            received: None,
        }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    fn open(&mut self, method: HttpMethod, url: &str) -> Result<()> {
        if let HttpMethod::Other(name) = &method {
            ureq::http::Method::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidMethod(name.clone()))?;
        }
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        self.prepared = Some(Prepared {
            method,
            url: parsed.into(),
            headers: Vec::new(),
        });
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.headers.push((name.to_string(), value.to_string()));
        }
    }

    fn send(&mut self, body: Option<String>) {
        let Some(prepared) = self.prepared.take() else {
            log::warn!("send called on a transport that was never opened");
            return;
        };
        let agent = self.agent.clone();
        self.task = Some(tokio::task::spawn_blocking(move || {
            exchange(&agent, prepared, body)
        }));
    }

    async fn completion(&mut self) -> Completion {
        let Some(task) = self.task.take() else {
            return Completion::Error;
        };
        match task.await {
            Ok(Ok(received)) => {
                self.received = Some(received);
                Completion::Load
            }
            Ok(Err(e)) => {
                log::debug!("exchange failed: {e}");
                Completion::Error
            }
            Err(e) => {
                log::error!("exchange task did not finish: {e}");
                Completion::Error
            }
        }
    }

    fn status(&self) -> u16 {
        self.received.as_ref().map_or(0, |r| r.status)
    }

    fn status_text(&self) -> &str {
        self.received.as_ref().map_or("", |r| r.status_text.as_str())
    }

    fn response_text(&self) -> &str {
        self.received.as_ref().map_or("", |r| r.text.as_str())
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[derive(Debug, ThisError)]
enum ExchangeError {
    #[error(transparent)]
    Ureq(#[from] ureq::Error),
    #[error("request could not be built: {0}")]
    Request(#[from] ureq::http::Error),
}

/// Build a request for a method the agent has no shorthand for.
fn custom_request(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<String>,
) -> std::result::Result<ureq::http::Request<String>, ureq::http::Error> {
    let mut builder = ureq::http::Request::builder().method(method).uri(url);
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(body.unwrap_or_default())
}

/// Execute one prepared request, blocking the current thread.
fn exchange(
    agent: &ureq::Agent,
    prepared: Prepared,
    body: Option<String>,
) -> std::result::Result<Received, ExchangeError> {
    let url = &prepared.url;
    let headers = &prepared.headers;
    if matches!(prepared.method, HttpMethod::Get | HttpMethod::Delete) && body.is_some() {
        log::debug!("{} {url} does not carry a body; dropping it", prepared.method);
    }
    let mut response = match (prepared.method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(url), headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(url), headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
        (HttpMethod::Other(name), body) => agent.run(custom_request(&name, url, headers, body)?),
    }?;

    // The response has arrived: from here on nothing may become an error
    // event because of what the body contains.
    let status = response.status();
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;
    Ok(Received {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_unparseable_url() {
        let mut transport = UreqConnector::new().connect();
        let err = transport.open(HttpMethod::Get, "not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn open_rejects_non_http_scheme() {
        let mut transport = UreqConnector::new().connect();
        let err = transport.open(HttpMethod::Get, "ftp://example.com/file").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { reason, .. } if reason.contains("ftp")));
    }

    #[test]
    fn open_rejects_malformed_method() {
        let mut transport = UreqConnector::new().connect();
        let err = transport
            .open(HttpMethod::Other("NOT A METHOD".to_string()), "http://127.0.0.1/")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(name) if name == "NOT A METHOD"));
    }

    #[test]
    fn open_accepts_custom_methods() {
        let mut transport = UreqConnector::new().connect();
        assert!(transport.open(HttpMethod::from("PATCH"), "http://127.0.0.1/").is_ok());
        assert!(transport.open(HttpMethod::from("PURGE"), "http://127.0.0.1/").is_ok());
    }

    #[tokio::test]
    async fn completion_without_send_is_an_error_event() {
        let mut transport = UreqConnector::new().connect();
        transport.open(HttpMethod::Get, "http://127.0.0.1:1/").unwrap();
        assert_eq!(transport.completion().await, Completion::Error);
        assert_eq!(transport.status(), 0);
        assert_eq!(transport.status_text(), "");
    }

    #[tokio::test]
    async fn refused_connection_is_an_error_event() {
        // Port 1 is reserved and nothing listens there in test environments.
        let mut transport = UreqConnector::new().connect();
        transport.open(HttpMethod::Get, "http://127.0.0.1:1/").unwrap();
        transport.send(None);
        assert_eq!(transport.completion().await, Completion::Error);
        assert_eq!(transport.status(), 0);
    }
}
