//! Error types for the request lifecycle.
//!
//! # Design
//! The two terminal failure paths of a request, the transport error event
//! and a loaded response with a failing status, both carry the same
//! `Rejection` payload (`status` plus `status_text`). They stay separate
//! variants so callers can tell "the exchange never completed" from "the
//! server answered with a bad status". Decoding failures are never folded
//! into either of them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `{status, statusText}` pair a request is rejected with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub status: u16,
    pub status_text: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status_text.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{} {}", self.status, self.status_text)
        }
    }
}

/// Errors a lifecycle call settles with.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport fired its error event (network failure, refused
    /// connection). No load happened.
    #[error("transport error (status {0})")]
    Transport(Rejection),

    /// The response loaded but its status is outside `[200, 400)`.
    #[error("HTTP {0}")]
    Status(Rejection),

    /// The response text is not valid JSON under the `json` response type.
    #[error("response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be encoded as JSON.
    #[error("request body could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// Neither the call nor the configuration supplied a url.
    #[error("no url given and none configured")]
    MissingUrl,

    /// The method name is not a valid HTTP token.
    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    /// The transport refused to open the url.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The background task running the exchange panicked or was dropped.
    #[error("transport task failed: {0}")]
    Join(String),
}

impl Error {
    /// The `{status, statusText}` payload for the two rejection paths that
    /// carry one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Transport(rejection) | Error::Status(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// A result which error type is always an [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
