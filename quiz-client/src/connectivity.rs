//! Connectivity oracle.
//!
//! The proxy never tests the network itself. It asks an injected
//! [`Connectivity`] provider whether the server is believed reachable, and
//! tells it when a request proved otherwise.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of truth for "is the question bank reachable".
pub trait Connectivity: Send + Sync {
    /// True if requests should be attempted against the server.
    fn is_online(&self) -> bool;

    /// A request failed at the transport level or with a 5xx status.
    fn report_unreachable(&self);
}

/// Connectivity flag flipped by hand.
///
/// Clones share the flag, so a test (or a platform network listener) can
/// keep one handle and give the other to the proxy.
#[derive(Debug, Clone)]
pub struct ManualConnectivity {
    online: Arc<AtomicBool>,
}

impl ManualConnectivity {
    /// Create an oracle with the given initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Set the current state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn report_unreachable(&self) {
        self.set_online(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let oracle = ManualConnectivity::new(true);
        let handle = oracle.clone();

        handle.set_online(false);
        assert!(!oracle.is_online());
    }

    #[test]
    fn unreachable_report_goes_offline() {
        let oracle = ManualConnectivity::default();
        assert!(oracle.is_online());

        oracle.report_unreachable();
        assert!(!oracle.is_online());

        oracle.set_online(true);
        assert!(oracle.is_online());
    }
}
