//! # cachenet
//!
//! A client-side networking layer for applications that must keep working
//! on flaky connections.
//!
//! `cachenet` fingerprints every request, keeps track of what is in flight,
//! caches successful GET responses under a time-to-live and falls back to
//! cached data when the device is offline.
//!
//! ## Features
//!
//! - **Fingerprinting**: SHA-256 over URL, payload and headers; header order never matters
//! - **In-flight registry**: look up and abort running requests by fingerprint
//! - **Response cache**: TTL from `Expires`, `X-Cache-Ttl` or the request itself;
//!   in-memory or SQLite-backed
//! - **Offline fallback**: stale cache entries answer requests while offline
//! - **Lifecycle events**: request started/ended, offline with and without cache
//! - **Default transport**: hyper HTTP/1.1 over TCP or BoringSSL TLS
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cachenet::{Client, NetConfig, Request};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new(NetConfig {
//!         base_url: "https://api.example.com".into(),
//!         ..NetConfig::default()
//!     });
//!
//!     let items = client.fetch(Request::get("/items")).await.unwrap();
//!     println!("{:?}", items.as_json());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes, transport lifecycle states, clocks
//! - [`http`] - Bodies, responses, cache stores and transports
//! - [`socket`] - TCP and TLS connection setup
//! - [`urlrequest`] - Normalization, fingerprinting, dispatch and classification
//! - [`client`] - The [`Client`] facade

pub mod base;
pub mod client;
pub mod config;
pub mod connectivity;
pub mod events;
pub mod http;
pub mod socket;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use client::{Client, FetchError};
pub use config::NetConfig;
pub use events::{EventSink, NetEvent};
pub use http::response::{Mime, Payload, RequestError};
pub use urlrequest::{Fingerprint, NetContext, Request};
