//! Promise-shaped HTTP request helper with lifecycle hooks.
//!
//! # Overview
//! `HttpService` turns a logical request (method, url, body, response type)
//! into one asynchronous exchange over a pluggable `Transport`, calling
//! named hooks around the open, load and send phases and handing the loaded
//! response to a replaceable `Parser`.
//!
//! # Design
//! - One fresh transport per call; each call settles exactly once.
//! - Loads with a status in `[200, 400)` resolve through the parser, other
//!   loads reject with `{status, statusText}`, and a transport error event
//!   rejects without running any further hook.
//! - Configuration and the last-response slot are shared by all calls on a
//!   client and follow last-writer-wins.
//! - `UreqConnector` is the shipped transport; tests plug in scripted ones.

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod parser;
pub mod transport;
pub mod ureq_transport;

pub use client::{HttpService, HttpServiceBuilder};
pub use config::{Headers, ServiceConfiguration, ServiceOptions};
pub use error::{Error, Rejection, Result};
pub use hooks::{Hook, Hooks, Phase};
pub use http::{HttpMethod, Payload, RequestBody, RequestDescriptor, ResponseType};
pub use parser::{DefaultParser, LastResponse, ParseContext, Parser};
pub use transport::{Completion, Connector, Transport};
pub use ureq_transport::{UreqConnector, UreqTransport};
