//! The request record handed to the dispatcher.

use crate::http::requestbody::RequestBody;
use crate::http::response::{Mime, Payload, RequestError};
use crate::urlrequest::fingerprint::Fingerprint;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub type SuccessCallback = Box<dyn FnOnce(Payload) + Send + 'static>;
pub type ErrorCallback = Box<dyn FnOnce(RequestError) + Send + 'static>;
pub type CompleteCallback = Box<dyn FnOnce() + Send + 'static>;

/// One call into the engine.
///
/// Built by the caller, filled in by normalization, then owned by the
/// dispatcher until its callbacks have run. A request with a fingerprint
/// is considered normalized.
pub struct Request {
    /// Absolute URL, or a path resolved against the configured base URL.
    pub url: String,
    pub method: Method,
    /// Merged over the context's default headers; request values win.
    pub headers: BTreeMap<String, String>,
    /// Payload. Serialized into the query string for GET.
    pub data: Option<Value>,
    /// Pre-encoded body, sent as-is instead of `data`.
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
    /// Read and write the response cache for this request.
    pub cache: bool,
    /// Suppress request-started / request-ended events.
    pub silent: bool,
    /// Forces how the response body is parsed.
    pub mime: Option<Mime>,
    /// Absolute expiry (epoch seconds) used when the response sets none.
    pub expire: Option<i64>,
    /// Carried on lifecycle events.
    pub event_name: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
    pub on_complete: Option<CompleteCallback>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::GET,
            headers: BTreeMap::new(),
            data: None,
            body: None,
            timeout: None,
            cache: true,
            silent: false,
            mime: None,
            expire: None,
            event_name: None,
            fingerprint: None,
            on_success: None,
            on_error: None,
            on_complete: None,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("body_len", &self.body.as_ref().map(RequestBody::len))
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .field("silent", &self.silent)
            .field("mime", &self.mime)
            .field("expire", &self.expire)
            .field("event_name", &self.event_name)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl Request {
    /// A GET request for `url`.
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new(url)
    }

    pub fn post<U: Into<String>>(url: U) -> Self {
        Self::new(url).method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn mime(mut self, mime: Mime) -> Self {
        self.mime = Some(mime);
        self
    }

    pub fn expire(mut self, expires_at: i64) -> Self {
        self.expire = Some(expires_at);
        self
    }

    pub fn event_name<S: Into<String>>(mut self, name: S) -> Self {
        self.event_name = Some(name.into());
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Payload) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RequestError) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.fingerprint.is_some()
    }
}
