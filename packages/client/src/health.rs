//! Per-address failure tracking with time-boxed quarantine
//!
//! An address that failed with a connection-class error is quarantined for a
//! fixed window. Expired records are evicted lazily on lookup, so the tracker
//! needs no background timer.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default quarantine window after a connection-class failure.
pub const DEFAULT_QUARANTINE: Duration = Duration::from_secs(30);

/// Entry cap above which `mark_failed` sweeps expired records inline.
const SWEEP_THRESHOLD: usize = 1024;

/// Tracks the most recent connection-class failure per address.
///
/// Shared between the resolver (which filters quarantined candidates) and
/// every [`FailoverClient`](crate::client::FailoverClient) that marks
/// failures. All operations are last-write-wins over a concurrent map; a
/// racy double-mark only refreshes the window, which is safe.
#[derive(Debug)]
pub struct AddressHealthTracker {
    failures: DashMap<IpAddr, Instant>,
    quarantine: Duration,
    marks: AtomicU64,
}

impl AddressHealthTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_quarantine(DEFAULT_QUARANTINE)
    }

    /// Create a tracker with a custom quarantine window.
    #[must_use]
    pub fn with_quarantine(quarantine: Duration) -> Self {
        Self {
            failures: DashMap::new(),
            quarantine,
            marks: AtomicU64::new(0),
        }
    }

    /// Record a connection-class failure against `addr`.
    pub fn mark_failed(&self, addr: IpAddr) {
        self.failures.insert(addr, Instant::now());
        self.marks.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(%addr, quarantine_secs = self.quarantine.as_secs(), "address quarantined");

        // Lazy eviction alone never visits addresses that are no longer
        // looked up; sweep inline once the map grows past the cap.
        if self.failures.len() > SWEEP_THRESHOLD {
            let quarantine = self.quarantine;
            self.failures
                .retain(|_, failed_at| failed_at.elapsed() < quarantine);
        }
    }

    /// Returns true while `addr` is inside its quarantine window.
    ///
    /// Evicts the record once expired, so a false result also means the
    /// failure record is gone.
    pub fn is_failed(&self, addr: IpAddr) -> bool {
        let quarantine = self.quarantine;
        let evicted = self
            .failures
            .remove_if(&addr, |_, failed_at| failed_at.elapsed() >= quarantine);
        if evicted.is_some() {
            return false;
        }
        self.failures.contains_key(&addr)
    }

    /// Number of failures recorded over the tracker's lifetime.
    #[must_use]
    pub fn total_marks(&self) -> u64 {
        self.marks.load(Ordering::Relaxed)
    }

    /// Number of addresses currently holding a failure record.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.failures.len()
    }
}

impl Default for AddressHealthTracker {
    fn default() -> Self {
        Self::new()
    }
}
