//! Client facade.
//!
//! Wraps a shared [`NetContext`] and exposes the whole engine: dispatch,
//! GET/POST helpers, an async `fetch`, queue inspection and cancellation,
//! cache management, default headers, the error handler and the ping server.
//!
//! # Example
//!
//! ```rust,ignore
//! use cachenet::{Client, NetConfig, Request};
//!
//! let client = Client::new(NetConfig::from_path("net.json".as_ref())?);
//!
//! client.send(
//!     Request::get("/items")
//!         .on_success(|payload| println!("{:?}", payload))
//!         .on_error(|e| eprintln!("{}", e)),
//! )?;
//!
//! let items = client.fetch(Request::get("/items")).await?;
//! ```

use crate::base::neterror::NetError;
use crate::config::NetConfig;
use crate::events::NetEvent;
use crate::http::response::{Mime, Payload, RequestError};
use crate::http::transport::TransportHandle;
use crate::urlrequest::context::NetContext;
use crate::urlrequest::dispatcher::dispatch;
use crate::urlrequest::fingerprint::Fingerprint;
use crate::urlrequest::normalize::normalize;
use crate::urlrequest::request::Request;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::oneshot;

/// Path the ping server answers on.
pub const PING_PATH: &str = "/ping";

/// Prefix under which ping settings are stored.
const SETTINGS_PREFIX: &str = "settings.";

/// Why [`Client::fetch`] produced no payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Rejected before any network call.
    #[error("request rejected: {0}")]
    Rejected(#[from] NetError),
    /// The server or the transport reported a failure.
    #[error("request failed: {0}")]
    Failed(#[from] RequestError),
    /// The request was dropped without completing.
    #[error("request dropped before completion")]
    Dropped,
}

type Slot<T> = Arc<Mutex<Option<T>>>;

fn slot<T>(value: T) -> Slot<T> {
    Arc::new(Mutex::new(Some(value)))
}

fn take<T>(slot: &Slot<T>) -> Option<T> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

/// Networking client.
///
/// Cheap to clone; clones share the same context, cache and queue.
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Arc<NetContext>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}

impl From<NetContext> for Client {
    fn from(ctx: NetContext) -> Self {
        Self::with_context(Arc::new(ctx))
    }
}

impl Client {
    /// Client with default collaborators for `config`.
    pub fn new(config: NetConfig) -> Self {
        Self::from(NetContext::new(config))
    }

    pub fn with_context(ctx: Arc<NetContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<NetContext> {
        &self.ctx
    }

    /// Dispatch a request. See [`dispatch`].
    pub fn send(&self, request: Request) -> Result<Fingerprint, NetError> {
        dispatch(&self.ctx, request)
    }

    /// GET `url`.
    pub fn get<U, S, E>(&self, url: U, on_success: S, on_error: E) -> Result<Fingerprint, NetError>
    where
        U: Into<String>,
        S: FnOnce(Payload) + Send + 'static,
        E: FnOnce(RequestError) + Send + 'static,
    {
        self.send(Request::get(url).on_success(on_success).on_error(on_error))
    }

    /// POST `data` to `url`.
    pub fn post<U, S, E>(
        &self,
        url: U,
        data: Value,
        on_success: S,
        on_error: E,
    ) -> Result<Fingerprint, NetError>
    where
        U: Into<String>,
        S: FnOnce(Payload) + Send + 'static,
        E: FnOnce(RequestError) + Send + 'static,
    {
        self.send(
            Request::post(url)
                .data(data)
                .on_success(on_success)
                .on_error(on_error),
        )
    }

    /// GET `url` with `data` as query, parsing the response as JSON.
    pub fn get_json<U, S, E>(
        &self,
        url: U,
        data: Option<Value>,
        on_success: S,
        on_error: E,
    ) -> Result<Fingerprint, NetError>
    where
        U: Into<String>,
        S: FnOnce(Payload) + Send + 'static,
        E: FnOnce(RequestError) + Send + 'static,
    {
        let mut request = Request::get(url).mime(Mime::Json);
        request.data = data;
        self.send(request.on_success(on_success).on_error(on_error))
    }

    /// POST `data` to `url`, parsing the response as JSON.
    pub fn post_json<U, S, E>(
        &self,
        url: U,
        data: Value,
        on_success: S,
        on_error: E,
    ) -> Result<Fingerprint, NetError>
    where
        U: Into<String>,
        S: FnOnce(Payload) + Send + 'static,
        E: FnOnce(RequestError) + Send + 'static,
    {
        self.send(
            Request::post(url)
                .mime(Mime::Json)
                .data(data)
                .on_success(on_success)
                .on_error(on_error),
        )
    }

    /// Dispatch `request` and wait for its outcome.
    ///
    /// Replaces the request's success and error callbacks.
    pub async fn fetch(&self, request: Request) -> Result<Payload, FetchError> {
        let (tx, rx) = oneshot::channel();
        let tx = slot(tx);
        let on_error_tx = Arc::clone(&tx);

        let request = request
            .on_success(move |payload| {
                if let Some(tx) = take(&tx) {
                    let _ = tx.send(Ok(payload));
                }
            })
            .on_error(move |e| {
                if let Some(tx) = take(&on_error_tx) {
                    let _ = tx.send(Err(FetchError::Failed(e)));
                }
            });

        self.send(request)?;
        rx.await.unwrap_or(Err(FetchError::Dropped))
    }

    /// Compute the fingerprint a request would be dispatched under.
    ///
    /// Normalizes `request` in place.
    pub fn fingerprint_of(&self, request: &mut Request) -> Result<Fingerprint, NetError> {
        normalize(&self.ctx, request)
    }

    pub fn is_queue_empty(&self) -> bool {
        self.ctx.registry().is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.ctx.registry().len()
    }

    pub fn queued_fingerprints(&self) -> Vec<Fingerprint> {
        self.ctx.registry().fingerprints()
    }

    /// The transport handle currently serving `fingerprint`.
    pub fn queued_request(&self, fingerprint: &Fingerprint) -> Option<Arc<dyn TransportHandle>> {
        self.ctx.registry().get(fingerprint)
    }

    /// Abort the newest in-flight request for `fingerprint`.
    ///
    /// Returns false when nothing is in flight under that fingerprint.
    pub fn abort_request(&self, fingerprint: &Fingerprint) -> bool {
        let aborted = self.ctx.registry().abort(fingerprint);
        if !aborted {
            tracing::debug!(%fingerprint, "abort requested for unknown request");
        }
        aborted
    }

    /// Drop the cached response for `fingerprint`. No-op without a cache.
    pub fn delete_cache(&self, fingerprint: &Fingerprint) {
        if let Some(cache) = self.ctx.cache() {
            cache.delete(fingerprint);
        }
    }

    /// Drop every cached response. No-op without a cache.
    pub fn reset_cache(&self) {
        if let Some(cache) = self.ctx.cache() {
            cache.clear();
        }
    }

    pub fn add_header<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        self.ctx.add_header(key, value);
    }

    pub fn remove_header(&self, key: &str) {
        self.ctx.remove_header(key);
    }

    pub fn reset_headers(&self) {
        self.ctx.reset_headers();
    }

    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(RequestError) + Send + Sync + 'static,
    {
        self.ctx.set_error_handler(handler);
    }

    pub fn reset_error_handler(&self) {
        self.ctx.reset_error_handler();
    }

    pub fn is_online(&self) -> bool {
        self.ctx.is_online()
    }

    /// Whether the application is configured to use a ping server.
    pub fn use_ping_server(&self) -> bool {
        self.ctx.config().use_ping_server
    }

    /// Outcome of the last ping, `None` before one has completed.
    pub fn is_server_connected(&self) -> Option<bool> {
        self.ctx.server_connected()
    }

    /// A setting received from the ping server.
    pub fn app_setting(&self, key: &str) -> Option<String> {
        self.ctx.app_setting(&format!("{}{}", SETTINGS_PREFIX, key))
    }

    /// Ping the server with a silent `POST /ping`.
    ///
    /// On success the returned JSON object is stored as application settings
    /// and `on_done(true)` runs; on any failure `on_done(false)` runs.
    pub fn connect_to_server<F>(&self, on_done: F) -> Result<Fingerprint, NetError>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let on_done = slot(on_done);
        let on_error_done = Arc::clone(&on_done);
        let on_reject_done = Arc::clone(&on_done);
        let success_ctx = Arc::clone(&self.ctx);
        let error_ctx = Arc::clone(&self.ctx);

        let request = Request::post(PING_PATH)
            .silent(true)
            .mime(Mime::Json)
            .on_success(move |payload| {
                success_ctx.set_server_connected(true);
                store_settings(&success_ctx, &payload);
                success_ctx.emit(NetEvent::PingSuccess);
                if let Some(done) = take(&on_done) {
                    done(true);
                }
            })
            .on_error(move |e| {
                tracing::warn!(code = e.code, message = %e.message, "ping failed");
                error_ctx.set_server_connected(false);
                error_ctx.emit(NetEvent::PingError);
                if let Some(done) = take(&on_error_done) {
                    done(false);
                }
            });

        self.send(request).map_err(|e| {
            self.ctx.set_server_connected(false);
            self.ctx.emit(NetEvent::PingError);
            if let Some(done) = take(&on_reject_done) {
                done(false);
            }
            e
        })
    }
}

fn store_settings(ctx: &NetContext, payload: &Payload) {
    let settings = match payload.as_json().and_then(Value::as_object) {
        Some(settings) => settings,
        None => return,
    };
    for (key, value) in settings {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        ctx.set_app_setting(format!("{}{}", SETTINGS_PREFIX, key), value);
    }
}
