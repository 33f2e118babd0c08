//! Scripted in-memory transport shared by the lifecycle tests.
//!
//! Every transport call and hook writes a line into a `Journal`, so tests
//! can assert on the exact order of events. Replies are registered per url
//! and picked up when a transport is opened for that url; a reply can be
//! sent up front or held back through a oneshot sender to control when each
//! exchange settles.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http_service::{Completion, Connector, Hooks, HttpMethod, Phase, Transport};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum Reply {
    Load {
        status: u16,
        status_text: String,
        text: String,
    },
    Error,
}

impl Reply {
    pub fn load(status: u16, text: &str) -> Self {
        Reply::Load {
            status,
            status_text: format!("status {status}"),
            text: text.to_string(),
        }
    }

    pub fn ok(text: &str) -> Self {
        Reply::load(200, text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }
}

#[derive(Default)]
pub struct Script {
    pub journal: Journal,
    replies: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply>>>>,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply that settles the next exchange on `url` at once.
    pub fn reply(&self, url: &str, reply: Reply) {
        self.pending(url).send(reply).unwrap();
    }

    /// Queue an exchange on `url` that settles when the sender is used.
    pub fn pending(&self, url: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    fn take(&self, url: &str) -> Option<oneshot::Receiver<Reply>> {
        self.replies.lock().unwrap().get_mut(url)?.pop_front()
    }

    pub fn connector(self: &Arc<Self>) -> ScriptedConnector {
        ScriptedConnector(Arc::clone(self))
    }
}

pub struct ScriptedConnector(Arc<Script>);

impl Connector for ScriptedConnector {
    fn connect(&self) -> Box<dyn Transport> {
        Box::new(ScriptedTransport {
            script: Arc::clone(&self.0),
            pending: None,
            loaded: None,
        })
    }
}

struct ScriptedTransport {
    script: Arc<Script>,
    pending: Option<oneshot::Receiver<Reply>>,
    loaded: Option<(u16, String, String)>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn open(&mut self, method: HttpMethod, url: &str) -> http_service::Result<()> {
        self.script.journal.push(format!("open {method} {url}"));
        self.pending = self.script.take(url);
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.script.journal.push(format!("header {name}: {value}"));
    }

    fn send(&mut self, body: Option<String>) {
        self.script.journal.push(format!("send {body:?}"));
    }

    async fn completion(&mut self) -> Completion {
        let Some(pending) = self.pending.take() else {
            return Completion::Error;
        };
        match pending.await {
            Ok(Reply::Load {
                status,
                status_text,
                text,
            }) => {
                self.loaded = Some((status, status_text, text));
                Completion::Load
            }
            Ok(Reply::Error) | Err(_) => Completion::Error,
        }
    }

    fn status(&self) -> u16 {
        self.loaded.as_ref().map_or(0, |(status, _, _)| *status)
    }

    fn status_text(&self) -> &str {
        self.loaded.as_ref().map_or("", |(_, text, _)| text.as_str())
    }

    fn response_text(&self) -> &str {
        self.loaded.as_ref().map_or("", |(_, _, body)| body.as_str())
    }
}

/// Hooks that write their phase name into `journal`.
pub fn journaling_hooks(journal: &Journal) -> Hooks {
    let phases = [
        (Phase::RequestWillOpen, "requestWillOpen"),
        (Phase::RequestDidOpen, "requestDidOpen"),
        (Phase::RequestWillLoad, "requestWillLoad"),
        (Phase::RequestDidLoad, "requestDidLoad"),
        (Phase::RequestWillSend, "requestWillSend"),
        (Phase::RequestDidSend, "requestDidSend"),
    ];
    phases
        .into_iter()
        .fold(Hooks::default(), |hooks, (phase, name)| {
            let journal = journal.clone();
            hooks.on(phase, move |_, _| journal.push(name))
        })
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
