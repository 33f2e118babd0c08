//! Named extension points around the request lifecycle.
//!
//! Every hook is optional and a no-op when unset. The lifecycle calls them
//! in a fixed order: will-open, did-open, will-load, will-send, did-send,
//! and did-load once a response has loaded (whatever its status). None of
//! them runs when the transport reports an error event.

use std::fmt;
use std::sync::Arc;

use crate::http::RequestDescriptor;
use crate::transport::Transport;

pub type Hook = Arc<dyn Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    RequestWillOpen,
    RequestDidOpen,
    RequestWillLoad,
    RequestDidLoad,
    RequestWillSend,
    RequestDidSend,
}

#[derive(Clone, Default)]
pub struct Hooks {
    request_will_open: Option<Hook>,
    request_did_open: Option<Hook>,
    request_will_load: Option<Hook>,
    request_did_load: Option<Hook>,
    request_will_send: Option<Hook>,
    request_did_send: Option<Hook>,
}

impl Hooks {
    pub fn on_request_will_open<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestWillOpen, hook)
    }

    /// Runs after the configured headers have been applied.
    pub fn on_request_did_open<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestDidOpen, hook)
    }

    pub fn on_request_will_load<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestWillLoad, hook)
    }

    /// Runs after a load settles the call, on success and on a bad status.
    pub fn on_request_did_load<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestDidLoad, hook)
    }

    pub fn on_request_will_send<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestWillSend, hook)
    }

    /// Runs once send is issued, before the response arrives.
    pub fn on_request_did_send<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        self.on(Phase::RequestDidSend, hook)
    }

    /// Install `hook` at `phase`, replacing any previous one.
    pub fn on<F>(mut self, phase: Phase, hook: F) -> Self
    where
        F: Fn(&mut dyn Transport, &RequestDescriptor) + Send + Sync + 'static,
    {
        *self.slot_mut(phase) = Some(Arc::new(hook));
        self
    }

    pub(crate) fn run(
        &self,
        phase: Phase,
        transport: &mut dyn Transport,
        descriptor: &RequestDescriptor,
    ) {
        log::trace!("{phase:?} {} {:?}", descriptor.method, descriptor.url);
        if let Some(hook) = self.slot(phase) {
            hook(transport, descriptor);
        }
    }

    fn slot(&self, phase: Phase) -> Option<&Hook> {
        match phase {
            Phase::RequestWillOpen => self.request_will_open.as_ref(),
            Phase::RequestDidOpen => self.request_did_open.as_ref(),
            Phase::RequestWillLoad => self.request_will_load.as_ref(),
            Phase::RequestDidLoad => self.request_did_load.as_ref(),
            Phase::RequestWillSend => self.request_will_send.as_ref(),
            Phase::RequestDidSend => self.request_did_send.as_ref(),
        }
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Option<Hook> {
        match phase {
            Phase::RequestWillOpen => &mut self.request_will_open,
            Phase::RequestDidOpen => &mut self.request_did_open,
            Phase::RequestWillLoad => &mut self.request_will_load,
            Phase::RequestDidLoad => &mut self.request_did_load,
            Phase::RequestWillSend => &mut self.request_will_send,
            Phase::RequestDidSend => &mut self.request_did_send,
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Closures carry no Debug impl; show which phases are set.
        f.debug_struct("Hooks")
            .field("request_will_open", &self.request_will_open.is_some())
            .field("request_did_open", &self.request_did_open.is_some())
            .field("request_will_load", &self.request_will_load.is_some())
            .field("request_did_load", &self.request_did_load.is_some())
            .field("request_will_send", &self.request_will_send.is_some())
            .field("request_did_send", &self.request_did_send.is_some())
            .finish()
    }
}
