//! Full-page reload policy.
//!
//! Network changes and wallet authorization failures are recovered by
//! reloading the whole page: partial client state cannot be trusted to
//! reconcile with a changed chain context. The embedding application decides
//! what a "reload" physically is by supplying a [`Reloader`].

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives reload requests from the bridge.
pub trait Reloader: Send + Sync {
    /// Request a full page reload.
    fn request_reload(&self, reason: &str);
}

/// Default reloader: logs the request and leaves the actual reload to the
/// host shell.
#[derive(Debug, Default)]
pub struct LogReloader;

impl Reloader for LogReloader {
    fn request_reload(&self, reason: &str) {
        tracing::warn!(reason, "full page reload requested");
    }
}

/// Counting reloader for tests.
#[derive(Debug, Default)]
pub struct CountingReloader {
    count: AtomicUsize,
}

impl CountingReloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads requested so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Reloader for CountingReloader {
    fn request_reload(&self, reason: &str) {
        tracing::debug!(reason, "reload requested (counting)");
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
