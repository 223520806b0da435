//! Connectivity probe.

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers "is the device online?" synchronously, before every dispatch.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity flag updated by whatever watches the platform network state.
#[derive(Debug)]
pub struct NetworkState {
    online: AtomicBool,
}

impl Default for NetworkState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkState {
    pub fn new(online: bool) -> Self {
        Self { online: AtomicBool::new(online) }
    }

    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if was != online {
            tracing::debug!(online, "connectivity changed");
        }
    }
}

impl Connectivity for NetworkState {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
