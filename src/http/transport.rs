//! Transport contract.
//!
//! The engine never touches sockets. It asks a [`Transport`] for a fresh
//! [`TransportHandle`], then drives it: `open`, `set_header`, `send`, and
//! possibly `abort`. Every `send` ends in exactly one call of the completion
//! hook, success or failure.

use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::http::requestbody::RequestBody;
use crate::http::response::RawResponse;
use http::Method;
use std::sync::Arc;
use std::time::Duration;

/// Invoked once when a transport call completes.
pub type CompletionHook = Box<dyn FnOnce(RawResponse) + Send + 'static>;

/// One HTTP exchange.
///
/// Handles are shared between the dispatcher and the in-flight registry, so
/// every method takes `&self`.
pub trait TransportHandle: Send + Sync {
    /// Set method and URL. Moves the handle from Created to Opened.
    fn open(&self, method: &Method, url: &str) -> Result<(), NetError>;

    /// Add a request header. Only valid while Opened.
    fn set_header(&self, name: &str, value: &str) -> Result<(), NetError>;

    /// Give up after `timeout`.
    fn set_timeout(&self, timeout: Duration);

    /// Transport-level response caching. The engine always turns it off.
    fn set_caching(&self, _enabled: bool) {}

    /// Start the exchange.
    ///
    /// Never fails synchronously: every outcome, including misuse, is
    /// reported through `on_complete`, which is called exactly once.
    fn send(&self, body: RequestBody, on_complete: CompletionHook);

    /// Cancel the exchange. No-op unless Opened or Sending.
    fn abort(&self);

    fn state(&self) -> LoadState;
}

/// Creates transport handles.
pub trait Transport: Send + Sync {
    fn create(&self) -> Arc<dyn TransportHandle>;
}
