//! The transport boundary the lifecycle drives.
//!
//! # Design
//! A `Transport` mirrors a browser-style request object: it is opened,
//! given headers, sent, and then settles with exactly one terminal event.
//! `send` only issues the exchange; `completion` is the one await point, so
//! the lifecycle can run its after-send hook before the response exists.
//! Status, status text and response text are readable once `completion`
//! has returned.
//!
//! A `Connector` hands out a fresh transport for every lifecycle call, so
//! concurrent calls never share one.

use async_trait::async_trait;

use crate::error::Result;
use crate::http::HttpMethod;

/// The terminal event of one exchange. The two are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A response was received, whatever its status.
    Load,
    /// The exchange failed before a response was received.
    Error,
}

#[async_trait]
pub trait Transport: Send {
    /// Prepare the request. Fails when the url cannot be used.
    fn open(&mut self, method: HttpMethod, url: &str) -> Result<()>;

    fn set_request_header(&mut self, name: &str, value: &str);

    /// Issue the request without waiting for the response.
    fn send(&mut self, body: Option<String>);

    /// Wait for the terminal event of the exchange started by `send`.
    async fn completion(&mut self) -> Completion;

    fn status(&self) -> u16;

    fn status_text(&self) -> &str;

    fn response_text(&self) -> &str;
}

/// Creates one transport per lifecycle call.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Box<dyn Transport>;
}

impl<F> Connector for F
where
    F: Fn() -> Box<dyn Transport> + Send + Sync,
{
    fn connect(&self) -> Box<dyn Transport> {
        self()
    }
}
