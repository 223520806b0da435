pub mod diskcache;
pub mod httpcache;
pub mod hypertransport;
pub mod requestbody;
pub mod response;
pub mod transport;

// Re-exports for convenience
pub use diskcache::SqliteCache;
pub use httpcache::{CacheEntry, MemoryCache, ResponseCache};
pub use hypertransport::HyperTransport;
pub use requestbody::RequestBody;
pub use response::{Mime, Payload, RawResponse, RequestError, ResponseInfo};
pub use transport::{CompletionHook, Transport, TransportHandle};
