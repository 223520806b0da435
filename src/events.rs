//! Lifecycle notifications.
//!
//! The engine fires events and forgets them; whoever holds the
//! [`EventSink`] decides where they go.

use crate::urlrequest::fingerprint::Fingerprint;
use tokio::sync::broadcast;

/// A named engine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// A request was handed to the transport.
    RequestStarted {
        fingerprint: Fingerprint,
        event_name: Option<String>,
    },
    /// A transport call completed (success or error).
    RequestEnded {
        fingerprint: Fingerprint,
        event_name: Option<String>,
    },
    /// Offline and nothing cached: the request was rejected before any network call.
    OfflineNoCache { fingerprint: Fingerprint },
    /// Offline, but a (possibly stale) cache entry answered the request.
    OfflineServedFromCache { fingerprint: Fingerprint },
    /// The ping server answered.
    PingSuccess,
    /// The ping server could not be reached.
    PingError,
}

impl NetEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            NetEvent::RequestStarted { .. } => "request-started",
            NetEvent::RequestEnded { .. } => "request-ended",
            NetEvent::OfflineNoCache { .. } => "offline-no-cache",
            NetEvent::OfflineServedFromCache { .. } => "offline-served-from-cache",
            NetEvent::PingSuccess => "ping-success",
            NetEvent::PingError => "ping-error",
        }
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            NetEvent::RequestStarted { fingerprint, .. }
            | NetEvent::RequestEnded { fingerprint, .. }
            | NetEvent::OfflineNoCache { fingerprint }
            | NetEvent::OfflineServedFromCache { fingerprint } => Some(fingerprint),
            NetEvent::PingSuccess | NetEvent::PingError => None,
        }
    }

    pub fn event_name(&self) -> Option<&str> {
        match self {
            NetEvent::RequestStarted { event_name, .. }
            | NetEvent::RequestEnded { event_name, .. } => event_name.as_deref(),
            _ => None,
        }
    }
}

/// Fire-and-forget event delivery.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: NetEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: NetEvent) {
        tracing::debug!(
            event = event.name(),
            fingerprint = ?event.fingerprint().map(Fingerprint::as_str),
            event_name = ?event.event_name(),
            "net event"
        );
    }
}

/// Fans events out to any number of subscribers.
///
/// Slow subscribers lag and lose the oldest events; emission never blocks.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<NetEvent>,
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(256)
    }
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NetEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: NetEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }
}
