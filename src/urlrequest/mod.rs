//! Request engine: normalization, fingerprinting, dispatch and response
//! classification, on top of the shared [`NetContext`](context::NetContext).

pub mod classifier;
pub mod context;
pub mod dispatcher;
pub mod fingerprint;
pub mod normalize;
pub mod registry;
pub mod request;

pub use context::{NetContext, NetContextBuilder};
pub use dispatcher::dispatch;
pub use fingerprint::{fingerprint, Fingerprint};
pub use registry::InFlightRegistry;
pub use request::Request;
