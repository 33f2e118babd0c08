//! Turning a loaded transport into the value a call resolves with.
//!
//! # Design
//! The parser is replaceable on its own, without touching the lifecycle.
//! It receives the client's last-response slot so that whatever it decides
//! to keep is what `HttpService::data` reports afterwards. The slot is a
//! single lock-free cell: concurrent completions overwrite each other and
//! the last writer wins.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::{Error, Result};
use crate::http::{Payload, ResponseType};
use crate::transport::Transport;

/// What a parser gets to work with.
pub struct ParseContext<'a> {
    pub transport: &'a dyn Transport,
    /// `None` for calls that never decode, such as DELETE.
    pub response_type: Option<&'a ResponseType>,
    pub cache: &'a LastResponse,
}

pub trait Parser: Send + Sync {
    fn parse(&self, ctx: ParseContext<'_>) -> Result<Payload>;
}

impl<F> Parser for F
where
    F: Fn(ParseContext<'_>) -> Result<Payload> + Send + Sync,
{
    fn parse(&self, ctx: ParseContext<'_>) -> Result<Payload> {
        self(ctx)
    }
}

/// Returns the raw response text, JSON-decoded under the `json` type.
///
/// The raw text is stored before decoding, so a malformed JSON response
/// leaves the text in the cache while the call itself fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl Parser for DefaultParser {
    fn parse(&self, ctx: ParseContext<'_>) -> Result<Payload> {
        let text = ctx.transport.response_text().to_string();
        ctx.cache.store(Payload::Text(text.clone()));

        if !ctx.response_type.is_some_and(ResponseType::is_json) {
            return Ok(Payload::Text(text));
        }

        let value = serde_json::from_str(&text).map_err(Error::Decode)?;
        let payload = Payload::Json(value);
        ctx.cache.store(payload.clone());
        Ok(payload)
    }
}

/// The single last-response slot of a client.
#[derive(Debug, Default)]
pub struct LastResponse {
    slot: ArcSwapOption<Payload>,
}

impl LastResponse {
    pub fn store(&self, payload: Payload) {
        self.slot.store(Some(Arc::new(payload)));
    }

    pub fn load(&self) -> Option<Arc<Payload>> {
        self.slot.load_full()
    }
}
