//! Default transport on hyper's HTTP/1.1 client connection.
//!
//! One connection per request: connect, handshake, send, collect the body.
//! The connection driver and the exchange each run as a task on the current
//! tokio runtime, so `send` returns immediately.

use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::http::requestbody::RequestBody;
use crate::http::response::RawResponse;
use crate::http::transport::{CompletionHook, Transport, TransportHandle};
use crate::socket::connectjob::ConnectJob;
use http::header::{HeaderName, HeaderValue, HOST};
use http::{HeaderMap, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use url::{Position, Url};

/// [`Transport`] backed by hyper.
#[derive(Debug, Default, Clone, Copy)]
pub struct HyperTransport;

impl HyperTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for HyperTransport {
    fn create(&self) -> Arc<dyn TransportHandle> {
        Arc::new(HyperHandle::default())
    }
}

#[derive(Default)]
struct Inner {
    state: LoadState,
    method: Method,
    url: Option<Url>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    cancel: Option<oneshot::Sender<()>>,
}

/// A single hyper-backed exchange.
#[derive(Default)]
pub struct HyperHandle {
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl HyperHandle {
    fn finish(inner: &Mutex<Inner>, state: LoadState) {
        let mut guard = lock(inner);
        guard.state = state;
        guard.cancel = None;
    }
}

impl TransportHandle for HyperHandle {
    fn open(&self, method: &Method, url: &str) -> Result<(), NetError> {
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
        let mut inner = lock(&self.inner);
        if inner.state != LoadState::Created {
            return Err(NetError::InvalidState);
        }
        inner.method = method.clone();
        inner.url = Some(url);
        inner.state = LoadState::Opened;
        Ok(())
    }

    fn set_header(&self, name: &str, value: &str) -> Result<(), NetError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| NetError::InvalidHeader)?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        let mut inner = lock(&self.inner);
        if inner.state != LoadState::Opened {
            return Err(NetError::InvalidState);
        }
        inner.headers.insert(name, value);
        Ok(())
    }

    fn set_timeout(&self, timeout: Duration) {
        lock(&self.inner).timeout = Some(timeout);
    }

    fn send(&self, body: RequestBody, on_complete: CompletionHook) {
        let (tx, cancel_rx) = oneshot::channel();
        let prepared = {
            let mut inner = lock(&self.inner);
            match (inner.state, inner.url.clone()) {
                (LoadState::Opened, Some(url)) => {
                    inner.state = LoadState::Sending;
                    inner.cancel = Some(tx);
                    Ok((inner.method.clone(), url, inner.headers.clone(), inner.timeout))
                }
                _ => Err(NetError::InvalidState),
            }
        };

        let (method, url, headers, timeout) = match prepared {
            Ok(parts) => parts,
            Err(e) => {
                on_complete(RawResponse::failed(e));
                return;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                Self::finish(&self.inner, LoadState::Completed);
                on_complete(RawResponse::failed(NetError::NoRuntime));
                return;
            }
        };

        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let exchange = exchange(method, url, headers, body);
            let result = tokio::select! {
                r = with_timeout(timeout, exchange) => r,
                _ = cancel_rx => Err(NetError::ConnectionAborted),
            };

            let raw = result.unwrap_or_else(RawResponse::failed);
            Self::finish(&inner, LoadState::Completed);
            on_complete(raw);
            Self::finish(&inner, LoadState::Disposed);
        });
    }

    fn abort(&self) {
        let mut inner = lock(&self.inner);
        if !inner.state.is_abortable() {
            return;
        }
        match inner.cancel.take() {
            Some(cancel) => {
                let _ = cancel.send(());
            }
            None => inner.state = LoadState::Disposed,
        }
    }

    fn state(&self) -> LoadState {
        lock(&self.inner).state
    }
}

async fn with_timeout<F>(timeout: Option<Duration>, fut: F) -> Result<RawResponse, NetError>
where
    F: std::future::Future<Output = Result<RawResponse, NetError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| NetError::ConnectionTimedOut)?,
        None => fut.await,
    }
}

async fn exchange(
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
) -> Result<RawResponse, NetError> {
    let socket = ConnectJob::connect(&url).await?;

    let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
        .await
        .map_err(|_| NetError::ConnectionFailed)?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "connection driver ended with error");
        }
    });

    let mut req = Request::builder()
        .method(method)
        .uri(&url[Position::BeforePath..])
        .body(Full::new(body.into_bytes()))
        .map_err(|_| NetError::InvalidUrl)?;

    *req.headers_mut() = headers;
    if !req.headers().contains_key(HOST) {
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(NetError::InvalidUrl),
        };
        let value = HeaderValue::from_str(&host).map_err(|_| NetError::InvalidUrl)?;
        req.headers_mut().insert(HOST, value);
    }

    let resp = sender.send_request(req).await.map_err(|e| {
        tracing::debug!(error = %e, "request failed");
        NetError::ConnectionClosed
    })?;

    let (parts, incoming) = resp.into_parts();
    let body = incoming
        .collect()
        .await
        .map_err(|_| NetError::HttpBodyError)?
        .to_bytes();

    Ok(RawResponse::new(parts.status.as_u16(), parts.headers, body))
}
