//! Net Context - shared state for every request.
//!
//! Bundles configuration, process-wide default headers, the replaceable
//! default error handler, the offline notice, and the collaborators the
//! engine talks to: response cache, transport, connectivity probe, event
//! sink and clock. The in-flight registry lives here too.

use crate::base::clock::{Clock, SystemClock};
use crate::config::NetConfig;
use crate::connectivity::{Connectivity, NetworkState};
use crate::events::{EventSink, NetEvent, TracingSink};
use crate::http::httpcache::{MemoryCache, ResponseCache};
use crate::http::hypertransport::HyperTransport;
use crate::http::response::RequestError;
use crate::http::transport::Transport;
use crate::urlrequest::registry::InFlightRegistry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Receives errors for requests that did not bring their own error callback.
pub type ErrorHandler = Arc<dyn Fn(RequestError) + Send + Sync>;

/// User-facing notice shown when a request is rejected offline: `(title, message)`.
pub type OfflineNotice = Arc<dyn Fn(&str, &str) + Send + Sync>;

fn default_error_handler() -> ErrorHandler {
    Arc::new(|e: RequestError| {
        tracing::error!(code = e.code, message = %e.message, "request failed");
    })
}

fn default_offline_notice() -> OfflineNotice {
    Arc::new(|title: &str, message: &str| {
        tracing::warn!(%title, %message, "offline");
    })
}

/// Shared engine state.
pub struct NetContext {
    config: NetConfig,
    default_headers: DashMap<String, String>,
    error_handler: RwLock<ErrorHandler>,
    offline_notice: OfflineNotice,
    cache: Option<Arc<dyn ResponseCache>>,
    transport: Arc<dyn Transport>,
    connectivity: Arc<dyn Connectivity>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    registry: InFlightRegistry,
    server_connected: RwLock<Option<bool>>,
    app_settings: DashMap<String, String>,
}

impl std::fmt::Debug for NetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetContext")
            .field("config", &self.config)
            .field("default_headers", &self.default_headers().len())
            .field("cache", &self.cache.is_some())
            .field("in_flight", &self.registry.len())
            .field("server_connected", &self.server_connected())
            .finish()
    }
}

impl Default for NetContext {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}

impl NetContext {
    /// Context with default collaborators for `config`.
    pub fn new(config: NetConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: NetConfig) -> NetContextBuilder {
        NetContextBuilder {
            config,
            cache: None,
            transport: None,
            connectivity: None,
            sink: None,
            clock: None,
            error_handler: None,
            offline_notice: None,
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Snapshot of the process-wide default headers.
    pub fn default_headers(&self) -> BTreeMap<String, String> {
        self.default_headers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Header names are stored lower-cased.
    pub fn add_header<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        self.default_headers
            .insert(key.into().to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&self, key: &str) {
        self.default_headers.remove(&key.to_ascii_lowercase());
    }

    /// Drop every default header.
    pub fn reset_headers(&self) {
        self.default_headers.clear();
    }

    /// The handler currently used for requests without an error callback.
    pub fn error_handler(&self) -> ErrorHandler {
        match self.error_handler.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(RequestError) + Send + Sync + 'static,
    {
        self.replace_error_handler(Arc::new(handler));
    }

    /// Restore the default handler, which logs the error.
    pub fn reset_error_handler(&self) {
        self.replace_error_handler(default_error_handler());
    }

    fn replace_error_handler(&self, handler: ErrorHandler) {
        match self.error_handler.write() {
            Ok(mut guard) => *guard = handler,
            Err(poisoned) => *poisoned.into_inner() = handler,
        }
    }

    /// Show the offline notice with the configured title and message.
    pub fn notify_offline(&self) {
        (self.offline_notice)(&self.config.offline_title, &self.config.offline_message);
    }

    /// `None` when caching is disabled.
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn emit(&self, event: NetEvent) {
        self.sink.emit(event);
    }

    /// Current time in epoch seconds.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn registry(&self) -> &InFlightRegistry {
        &self.registry
    }

    /// Outcome of the last ping, `None` before the first one completes.
    pub fn server_connected(&self) -> Option<bool> {
        match self.server_connected.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_server_connected(&self, connected: bool) {
        match self.server_connected.write() {
            Ok(mut guard) => *guard = Some(connected),
            Err(poisoned) => *poisoned.into_inner() = Some(connected),
        }
    }

    pub fn app_setting(&self, key: &str) -> Option<String> {
        self.app_settings.get(key).map(|v| v.value().clone())
    }

    pub fn set_app_setting<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        self.app_settings.insert(key.into(), value.into());
    }
}

/// Builder for [`NetContext`]. Anything not set gets its default.
pub struct NetContextBuilder {
    config: NetConfig,
    cache: Option<Arc<dyn ResponseCache>>,
    transport: Option<Arc<dyn Transport>>,
    connectivity: Option<Arc<dyn Connectivity>>,
    sink: Option<Arc<dyn EventSink>>,
    clock: Option<Arc<dyn Clock>>,
    error_handler: Option<ErrorHandler>,
    offline_notice: Option<OfflineNotice>,
}

impl NetContextBuilder {
    /// Response cache. Ignored when `use_cache` is off.
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(RequestError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn offline_notice<F>(mut self, notice: F) -> Self
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.offline_notice = Some(Arc::new(notice));
        self
    }

    pub fn build(self) -> NetContext {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let cache = if self.config.use_cache {
            let default_clock = Arc::clone(&clock);
            Some(self.cache.unwrap_or_else(|| {
                Arc::new(MemoryCache::new().with_clock(default_clock)) as Arc<dyn ResponseCache>
            }))
        } else {
            None
        };

        let default_headers = self
            .config
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();

        NetContext {
            default_headers,
            error_handler: RwLock::new(self.error_handler.unwrap_or_else(default_error_handler)),
            offline_notice: self.offline_notice.unwrap_or_else(default_offline_notice),
            cache,
            transport: self.transport.unwrap_or_else(|| Arc::new(HyperTransport::new())),
            connectivity: self
                .connectivity
                .unwrap_or_else(|| Arc::new(NetworkState::default())),
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            clock,
            registry: InFlightRegistry::new(),
            server_connected: RwLock::new(None),
            app_settings: DashMap::new(),
            config: self.config,
        }
    }
}
