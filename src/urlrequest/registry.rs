//! In-flight request registry.
//!
//! Maps a fingerprint to the transport handle currently serving it. The
//! registry is bookkeeping, not a lock: dispatching a fingerprint that is
//! already in flight replaces the slot, and only the newest handle stays
//! reachable for [`abort`](InFlightRegistry::abort). Any completion under a
//! fingerprint clears its slot, so once the older call finishes the newer
//! one can no longer be aborted.

use crate::http::transport::TransportHandle;
use crate::urlrequest::fingerprint::Fingerprint;
use dashmap::DashMap;
use std::sync::Arc;

/// Shared map of in-flight requests.
#[derive(Default)]
pub struct InFlightRegistry {
    slots: DashMap<Fingerprint, Arc<dyn TransportHandle>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `fingerprint`, returning the handle it displaced.
    pub fn insert(
        &self,
        fingerprint: Fingerprint,
        handle: Arc<dyn TransportHandle>,
    ) -> Option<Arc<dyn TransportHandle>> {
        let previous = self.slots.insert(fingerprint.clone(), handle);
        if previous.is_some() {
            tracing::debug!(%fingerprint, "in-flight slot replaced by newer request");
        }
        previous
    }

    /// Clear the slot for `fingerprint`. Returns false if it was already empty.
    pub fn remove(&self, fingerprint: &Fingerprint) -> bool {
        self.slots.remove(fingerprint).is_some()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<dyn TransportHandle>> {
        self.slots.get(fingerprint).map(|slot| Arc::clone(slot.value()))
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.slots.contains_key(fingerprint)
    }

    /// Abort whatever handle occupies the slot. Returns false if none does.
    pub fn abort(&self, fingerprint: &Fingerprint) -> bool {
        // Clone out first: abort may complete synchronously and re-enter remove().
        match self.get(fingerprint) {
            Some(handle) => {
                tracing::debug!(%fingerprint, "aborting in-flight request");
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.slots.iter().map(|slot| slot.key().clone()).collect()
    }
}
