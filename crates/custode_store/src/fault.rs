//! Fault injection for exercising infrastructure-failure paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Shared switchboard for injecting store failures in tests.
///
/// Cloning the handle shares the underlying switches, so a test can hold
/// one clone while the store under test holds another.
#[derive(Debug, Clone, Default)]
pub struct FaultHandle {
    inner: Arc<FaultState>,
}

#[derive(Debug, Default)]
struct FaultState {
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    latency_ms: AtomicU64,
}

impl FaultHandle {
    /// Create a handle with no faults active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with a transient error.
    pub fn fail_writes(&self, enabled: bool) {
        self.inner.fail_writes.store(enabled, Ordering::Relaxed);
    }

    /// Make every read fail with a transient error.
    pub fn fail_reads(&self, enabled: bool) {
        self.inner.fail_reads.store(enabled, Ordering::Relaxed);
    }

    /// Delay every operation by `latency`; pair with a short operation
    /// deadline to force timeouts.
    pub fn set_latency(&self, latency: Duration) {
        self.inner
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn writes_failing(&self) -> bool {
        self.inner.fail_writes.load(Ordering::Relaxed)
    }

    pub(crate) fn reads_failing(&self) -> bool {
        self.inner.fail_reads.load(Ordering::Relaxed)
    }

    pub(crate) fn latency(&self) -> Option<Duration> {
        match self.inner.latency_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
