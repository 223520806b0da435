//! Shared fixtures: an in-process transport that records every call and
//! completes only when a test tells it to.

#![allow(dead_code)]

use cachenet::base::clock::ManualClock;
use cachenet::base::loadstate::LoadState;
use cachenet::base::neterror::NetError;
use cachenet::connectivity::NetworkState;
use cachenet::events::{BroadcastSink, NetEvent};
use cachenet::http::requestbody::RequestBody;
use cachenet::http::response::RawResponse;
use cachenet::http::transport::{CompletionHook, Transport, TransportHandle};
use cachenet::{Client, NetConfig, NetContext};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

pub const START: i64 = 1_700_000_000;

#[derive(Clone)]
struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

/// Records what the engine asked for and holds the completion hook.
#[derive(Default)]
pub struct MockHandle {
    state: Mutex<LoadState>,
    method: Mutex<Option<Method>>,
    url: Mutex<Option<String>>,
    headers: Mutex<Vec<(String, String)>>,
    timeout: Mutex<Option<Duration>>,
    body: Mutex<Option<Bytes>>,
    hook: Mutex<Option<CompletionHook>>,
    auto: Option<Canned>,
    header_error: Option<NetError>,
}

impl MockHandle {
    pub fn method(&self) -> Option<Method> {
        self.method.lock().unwrap().clone()
    }

    pub fn url(&self) -> Option<String> {
        self.url.lock().unwrap().clone()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        *self.timeout.lock().unwrap()
    }

    pub fn body(&self) -> Option<Bytes> {
        self.body.lock().unwrap().clone()
    }

    /// Complete the call with an HTTP response.
    pub fn respond(&self, status: u16, headers: &[(&str, &str)], body: &str) {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        self.complete(RawResponse::new(status, map, Bytes::from(body.to_string())));
    }

    /// Complete the call with a transport failure.
    pub fn fail(&self, error: NetError) {
        self.complete(RawResponse::failed(error));
    }

    fn complete(&self, raw: RawResponse) {
        let hook = self.hook.lock().unwrap().take().expect("no pending send");
        *self.state.lock().unwrap() = LoadState::Completed;
        hook(raw);
        *self.state.lock().unwrap() = LoadState::Disposed;
    }
}

impl TransportHandle for MockHandle {
    fn open(&self, method: &Method, url: &str) -> Result<(), NetError> {
        *self.method.lock().unwrap() = Some(method.clone());
        *self.url.lock().unwrap() = Some(url.to_string());
        *self.state.lock().unwrap() = LoadState::Opened;
        Ok(())
    }

    fn set_header(&self, name: &str, value: &str) -> Result<(), NetError> {
        if let Some(error) = self.header_error.clone() {
            return Err(error);
        }
        self.headers
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn set_timeout(&self, timeout: Duration) {
        *self.timeout.lock().unwrap() = Some(timeout);
    }

    fn send(&self, body: RequestBody, on_complete: CompletionHook) {
        *self.body.lock().unwrap() = Some(body.into_bytes());
        *self.state.lock().unwrap() = LoadState::Sending;
        *self.hook.lock().unwrap() = Some(on_complete);

        if let Some(canned) = self.auto.clone() {
            let headers: Vec<(&str, &str)> = canned
                .headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            self.respond(canned.status, &headers, &canned.body);
        }
    }

    fn abort(&self) {
        let pending = self.hook.lock().unwrap().is_some();
        if pending {
            self.fail(NetError::ConnectionAborted);
        }
    }

    fn state(&self) -> LoadState {
        *self.state.lock().unwrap()
    }
}

/// Hands out [`MockHandle`]s and keeps them for inspection.
#[derive(Default)]
pub struct MockTransport {
    handles: Mutex<Vec<Arc<MockHandle>>>,
    auto: Mutex<Option<Canned>>,
    header_error: Mutex<Option<NetError>>,
}

impl MockTransport {
    /// Answer every later call immediately with this response.
    pub fn auto_respond(&self, status: u16, headers: &[(&str, &str)], body: &str) {
        *self.auto.lock().unwrap() = Some(Canned {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        });
    }

    /// Make `set_header` fail on every later call.
    pub fn reject_headers(&self, error: NetError) {
        *self.header_error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    pub fn handle(&self, index: usize) -> Arc<MockHandle> {
        self.handles.lock().unwrap()[index].clone()
    }

    pub fn last(&self) -> Arc<MockHandle> {
        self.handles.lock().unwrap().last().cloned().expect("no calls")
    }
}

impl Transport for MockTransport {
    fn create(&self) -> Arc<dyn TransportHandle> {
        let handle = Arc::new(MockHandle {
            auto: self.auto.lock().unwrap().clone(),
            header_error: self.header_error.lock().unwrap().clone(),
            ..MockHandle::default()
        });
        self.handles.lock().unwrap().push(handle.clone());
        handle
    }
}

/// A client wired to mocks, plus the knobs tests turn.
pub struct Harness {
    pub client: Client,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
    pub network: Arc<NetworkState>,
    pub events: broadcast::Receiver<NetEvent>,
    pub offline_notices: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(NetConfig::default())
    }

    pub fn with_config(config: NetConfig) -> Self {
        let transport = Arc::new(MockTransport::default());
        let clock = Arc::new(ManualClock::new(START));
        let network = Arc::new(NetworkState::new(true));
        let sink = Arc::new(BroadcastSink::new(64));
        let events = sink.subscribe();
        let offline_notices = Arc::new(AtomicUsize::new(0));

        let notices = offline_notices.clone();
        let ctx = NetContext::builder(config)
            .transport(transport.clone())
            .clock(clock.clone())
            .connectivity(network.clone())
            .event_sink(sink)
            .offline_notice(move |_, _| {
                notices.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        Self {
            client: Client::from(ctx),
            transport,
            clock,
            network,
            events,
            offline_notices,
        }
    }

    /// Event names received so far.
    pub fn drain_events(&mut self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn notices(&self) -> usize {
        self.offline_notices.load(Ordering::SeqCst)
    }
}

/// Collects callback outcomes.
#[derive(Clone)]
pub struct Outcomes<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for Outcomes<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone + Send + 'static> Outcomes<T> {
    pub fn recorder(&self) -> impl FnOnce(T) + Send + 'static {
        let inner = self.inner.clone();
        move |value| inner.lock().unwrap().push(value)
    }

    pub fn all(&self) -> Vec<T> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}
