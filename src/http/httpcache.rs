//! Response cache.
//!
//! [`ResponseCache`] is the contract the engine reads and writes through;
//! [`MemoryCache`] is the in-process implementation.
//!
//! Entries are keyed by request fingerprint and carry an absolute expiry in
//! epoch seconds. Expired entries are kept: they are not served as fresh,
//! but an offline dispatch may still ask for them with `allow_stale`.

use crate::base::clock::{Clock, SystemClock};
use crate::http::response::{Mime, Payload};
use crate::urlrequest::fingerprint::Fingerprint;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cached response entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    /// Parsed response payload
    pub payload: Payload,
    pub mime: Mime,
    /// Absolute expiry (epoch seconds)
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn new(fingerprint: Fingerprint, payload: Payload, expires_at: i64) -> Self {
        let mime = payload.mime();
        Self {
            fingerprint,
            payload,
            mime,
            expires_at,
        }
    }

    /// Check if the entry is still fresh at `now`.
    pub fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at
    }

    fn size(&self) -> usize {
        match &self.payload {
            Payload::Raw(b) => b.len(),
            Payload::Json(v) => v.to_string().len(),
        }
    }
}

/// Storage contract for cached responses.
pub trait ResponseCache: Send + Sync {
    /// Look up an entry. Expired entries are returned only when `allow_stale` is set.
    fn get(&self, key: &Fingerprint, allow_stale: bool) -> Option<CacheEntry>;

    /// Store an entry under its fingerprint, replacing any previous one.
    fn set(&self, entry: CacheEntry);

    /// Remove one entry.
    fn delete(&self, key: &Fingerprint);

    /// Remove every entry.
    fn clear(&self);
}

/// In-memory response cache.
///
/// Thread-safe implementation using DashMap for concurrent access.
/// Enforces entry and size limits; eviction drops expired entries first,
/// then the entry closest to expiry.
pub struct MemoryCache {
    entries: DashMap<Fingerprint, CacheEntry>,
    max_entries: usize,
    current_size: AtomicUsize,
    max_size_bytes: usize,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create a new cache with default limits.
    pub fn new() -> Self {
        Self::with_limits(1000, 50 * 1024 * 1024) // 50MB default
    }

    /// Create a cache with custom limits.
    pub fn with_limits(max_entries: usize, max_size_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
            current_size: AtomicUsize::new(0),
            max_size_bytes,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use another time source for freshness checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get current cache size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Evict entries if needed to make room.
    fn maybe_evict(&self, new_entry_size: usize) {
        while self.entries.len() >= self.max_entries && !self.entries.is_empty() {
            self.evict_one();
        }

        while self.current_size.load(Ordering::Relaxed) + new_entry_size > self.max_size_bytes
            && !self.entries.is_empty()
        {
            self.evict_one();
        }
    }

    fn evict_one(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| e.value().expires_at)
            .map(|e| e.key().clone());

        if let Some(key) = victim {
            tracing::debug!(fingerprint = %key, "evicting cache entry");
            self.remove_by_key(&key);
        }
    }

    fn remove_by_key(&self, key: &Fingerprint) {
        if let Some((_, entry)) = self.entries.remove(key) {
            self.current_size.fetch_sub(entry.size(), Ordering::Relaxed);
        }
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &Fingerprint, allow_stale: bool) -> Option<CacheEntry> {
        let entry = self.entries.get(key)?;
        if allow_stale || entry.is_fresh(self.clock.now()) {
            Some(entry.clone())
        } else {
            None
        }
    }

    fn set(&self, entry: CacheEntry) {
        let size = entry.size();
        if size > self.max_size_bytes {
            tracing::debug!(fingerprint = %entry.fingerprint, size, "entry larger than cache");
            return;
        }

        self.remove_by_key(&entry.fingerprint);
        self.maybe_evict(size);

        self.current_size.fetch_add(size, Ordering::Relaxed);
        self.entries.insert(entry.fingerprint.clone(), entry);
    }

    fn delete(&self, key: &Fingerprint) {
        self.remove_by_key(key);
    }

    fn clear(&self) {
        self.entries.clear();
        self.current_size.store(0, Ordering::Relaxed);
    }
}
