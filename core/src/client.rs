//! The request lifecycle and the verb builders on top of it.
//!
//! # Design
//! `HttpService` is a cheap handle (`Arc` inside) so one client can drive
//! many concurrent calls and hand itself to the initial fetch task. Each
//! call of `execute` owns one fresh transport and settles exactly once:
//! either the transport's error event rejects it, or the load event
//! resolves or rejects it on the `[200, 400)` status rule.
//!
//! Shared state is deliberately small and unlocked. The configuration sits
//! in an `ArcSwap` updated by read-copy-update, the last-response slot is a
//! single `ArcSwapOption`. Concurrent calls see last-writer-wins.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;

use crate::config::{ServiceConfiguration, ServiceOptions};
use crate::error::{Error, Rejection, Result};
use crate::hooks::{Hooks, Phase};
use crate::http::{HttpMethod, Payload, RequestBody, RequestDescriptor};
use crate::parser::{DefaultParser, LastResponse, ParseContext, Parser};
use crate::transport::{Completion, Connector, Transport};

/// Promise-shaped HTTP client with lifecycle hooks and a pluggable parser.
#[derive(Clone)]
pub struct HttpService {
    inner: Arc<Inner>,
}

struct Inner {
    config: ArcSwap<ServiceConfiguration>,
    cache: LastResponse,
    hooks: Hooks,
    parser: Arc<dyn Parser>,
    connector: Arc<dyn Connector>,
    initial_fetch: Mutex<Option<JoinHandle<Result<Payload>>>>,
}

/// Collects hooks and a parser before the client starts.
pub struct HttpServiceBuilder {
    options: ServiceOptions,
    hooks: Hooks,
    parser: Arc<dyn Parser>,
}

impl HttpServiceBuilder {
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Build the client. With `fetchOnInit` set, the initial request is
    /// spawned here; see [`HttpService::initial_fetch`].
    pub fn build(self, connector: impl Connector + 'static) -> HttpService {
        let service = HttpService {
            inner: Arc::new(Inner {
                config: ArcSwap::from_pointee(self.options.into()),
                cache: LastResponse::default(),
                hooks: self.hooks,
                parser: self.parser,
                connector: Arc::new(connector),
                initial_fetch: Mutex::new(None),
            }),
        };
        service.initialize();
        service
    }
}

impl HttpService {
    pub fn new(options: ServiceOptions, connector: impl Connector + 'static) -> Self {
        Self::builder(options).build(connector)
    }

    pub fn builder(options: ServiceOptions) -> HttpServiceBuilder {
        HttpServiceBuilder {
            options,
            hooks: Hooks::default(),
            parser: Arc::new(DefaultParser),
        }
    }

    fn initialize(&self) {
        let runtime = tokio::runtime::Handle::try_current();
        if runtime.is_err() {
            log::warn!("no tokio runtime is running; requests can only be awaited inside one");
        }

        let config = self.inner.config.load_full();
        if !config.fetch_on_init {
            return;
        }
        let Ok(handle) = runtime else {
            log::error!("fetchOnInit is set but there is no runtime to run the request on");
            return;
        };

        let descriptor = RequestDescriptor::new(config.method.clone(), config.url.clone())
            .with_response_type(config.response_type.clone());
        let service = self.clone();
        let task = handle.spawn(async move { service.execute(descriptor).await });
        *self
            .inner
            .initial_fetch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    /// Await the request spawned at construction by `fetchOnInit`.
    ///
    /// Returns `None` when no such request was spawned or its outcome was
    /// already taken.
    pub async fn initial_fetch(&self) -> Option<Result<Payload>> {
        let task = self
            .inner
            .initial_fetch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        Some(task.await.unwrap_or_else(|e| Err(Error::Join(e.to_string()))))
    }

    /// The most recently parsed response body.
    pub fn data(&self) -> Option<Arc<Payload>> {
        self.inner.cache.load()
    }

    /// A snapshot of the live configuration.
    pub fn configuration(&self) -> Arc<ServiceConfiguration> {
        self.inner.config.load_full()
    }

    /// GET `url`, or the configured url. Records itself as the configured
    /// method and url.
    pub fn get(&self, url: Option<&str>) -> impl Future<Output = Result<Payload>> + '_ {
        let config = self.update_config(|config| {
            let url = config.resolve_url(url);
            config.record_get(url);
        });
        let descriptor = RequestDescriptor::new(HttpMethod::Get, config.url.clone())
            .with_response_type(config.response_type.clone());
        self.execute(descriptor)
    }

    /// DELETE `url`, or the configured url. The response is never decoded.
    pub fn delete(&self, url: Option<&str>) -> impl Future<Output = Result<Payload>> + '_ {
        let config = self.inner.config.load_full();
        let descriptor = RequestDescriptor::new(HttpMethod::Delete, config.resolve_url(url));
        self.execute(descriptor)
    }

    /// POST `body` to `url`, or the configured url.
    ///
    /// A JSON client without headers gets `content-type: application/json`
    /// installed into its configuration, for this and every later call.
    pub fn post(
        &self,
        url: Option<&str>,
        body: Option<RequestBody>,
    ) -> impl Future<Output = Result<Payload>> + '_ {
        self.with_body(HttpMethod::Post, url, body)
    }

    /// PUT `body` to `url`, or the configured url. Installs the JSON content
    /// type like [`post`](Self::post).
    pub fn put(
        &self,
        url: Option<&str>,
        body: Option<RequestBody>,
    ) -> impl Future<Output = Result<Payload>> + '_ {
        self.with_body(HttpMethod::Put, url, body)
    }

    fn with_body(
        &self,
        method: HttpMethod,
        url: Option<&str>,
        body: Option<RequestBody>,
    ) -> impl Future<Output = Result<Payload>> + '_ {
        let config = self.update_config(|config| {
            if config.install_json_content_type() {
                log::debug!("installed JSON content type into client headers");
            }
        });
        let descriptor = RequestDescriptor::new(method, config.resolve_url(url))
            .with_response_type(config.response_type.clone())
            .with_body(body);
        self.execute(descriptor)
    }

    /// Drive one request from descriptor to settlement.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Payload> {
        let inner = &self.inner;
        let hooks = &inner.hooks;
        let body = descriptor.encoded_body()?;
        let mut transport = inner.connector.connect();

        hooks.run(Phase::RequestWillOpen, transport.as_mut(), &descriptor);
        let url = descriptor.url.as_deref().ok_or(Error::MissingUrl)?;
        transport.open(descriptor.method.clone(), url)?;
        self.apply_headers(transport.as_mut());
        hooks.run(Phase::RequestDidOpen, transport.as_mut(), &descriptor);

        hooks.run(Phase::RequestWillLoad, transport.as_mut(), &descriptor);

        hooks.run(Phase::RequestWillSend, transport.as_mut(), &descriptor);
        transport.send(body);
        hooks.run(Phase::RequestDidSend, transport.as_mut(), &descriptor);

        let completion = transport.completion().await;
        let rejection = Rejection {
            status: transport.status(),
            status_text: transport.status_text().to_string(),
        };

        if completion == Completion::Error {
            log::debug!("{} {url} failed: transport error", descriptor.method);
            return Err(Error::Transport(rejection));
        }

        let outcome = if (200..400).contains(&rejection.status) {
            inner.parser.parse(ParseContext {
                transport: transport.as_ref(),
                response_type: descriptor.response_type.as_ref(),
                cache: &inner.cache,
            })
        } else {
            Err(Error::Status(rejection))
        };
        log::debug!(
            "{} {url} loaded with status {}: {}",
            descriptor.method,
            transport.status(),
            if outcome.is_ok() { "resolved" } else { "rejected" }
        );
        hooks.run(Phase::RequestDidLoad, transport.as_mut(), &descriptor);
        outcome
    }

    fn apply_headers(&self, transport: &mut dyn Transport) {
        let config = self.inner.config.load();
        for (name, value) in config.headers.iter().flatten() {
            transport.set_request_header(name, value);
        }
    }

    /// Read-copy-update the configuration, returning the stored result.
    fn update_config<F>(&self, mut update: F) -> Arc<ServiceConfiguration>
    where
        F: FnMut(&mut ServiceConfiguration),
    {
        let mut updated = Arc::default();
        self.inner.config.rcu(|current| {
            let mut next = ServiceConfiguration::clone(current);
            update(&mut next);
            updated = Arc::new(next);
            Arc::clone(&updated)
        });
        updated
    }
}
