//! Hostname resolution cache with TTL and stale fallback
//!
//! Entries are fresh for a bounded TTL and then kept indefinitely as a
//! degraded fallback until the next successful resolution overwrites them.
//! Monitoring targets flap; a stale address list beats no address list.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default freshness window for cached resolutions.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    addrs: Vec<IpAddr>,
    resolved_at: Instant,
}

/// Cache hit/miss counters, snapshotted for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale_served: u64,
}

/// Maps hostname to its most recent successful resolution.
#[derive(Debug)]
pub struct DnsCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    stale_served: AtomicU64,
}

impl DnsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom freshness window.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale_served: AtomicU64::new(0),
        }
    }

    /// Returns the cached addresses for `hostname` while the entry is fresh.
    pub fn fresh(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        let entry = self.entries.get(hostname);
        match entry {
            Some(entry) if entry.resolved_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(hostname, addrs = ?entry.addrs, "dns cache hit");
                Some(entry.addrs.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(hostname, "dns cache miss");
                None
            }
        }
    }

    /// Returns the cached addresses regardless of age. Used as a degraded
    /// fallback when every resolution strategy fails.
    pub fn stale(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        let addrs = self.entries.get(hostname).map(|e| e.addrs.clone())?;
        self.stale_served.fetch_add(1, Ordering::Relaxed);
        Some(addrs)
    }

    /// Overwrite the entry for `hostname` with a fresh timestamp.
    ///
    /// Empty address lists are never stored; an empty result must not
    /// shadow a usable stale entry.
    pub fn store(&self, hostname: &str, addrs: Vec<IpAddr>) {
        if addrs.is_empty() {
            return;
        }
        self.entries.insert(
            hostname.to_string(),
            CacheEntry {
                addrs,
                resolved_at: Instant::now(),
            },
        );
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
        }
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addrs() -> Vec<IpAddr> {
        vec![
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        ]
    }

    #[test]
    fn fresh_entry_is_returned() {
        let cache = DnsCache::new();
        cache.store("proxmox.lan", addrs());
        assert_eq!(cache.fresh("proxmox.lan"), Some(addrs()));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn unknown_hostname_misses() {
        let cache = DnsCache::new();
        assert_eq!(cache.fresh("pbs.lan"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn expired_entry_misses_but_serves_stale() {
        let cache = DnsCache::with_ttl(Duration::from_millis(10));
        cache.store("proxmox.lan", addrs());
        std::thread::sleep(Duration::from_millis(25));

        assert_eq!(cache.fresh("proxmox.lan"), None);
        assert_eq!(cache.stale("proxmox.lan"), Some(addrs()));
        assert_eq!(cache.stats().stale_served, 1);
    }

    #[test]
    fn empty_result_does_not_overwrite() {
        let cache = DnsCache::new();
        cache.store("proxmox.lan", addrs());
        cache.store("proxmox.lan", Vec::new());
        assert_eq!(cache.stale("proxmox.lan"), Some(addrs()));
    }

    #[test]
    fn store_refreshes_timestamp() {
        let cache = DnsCache::with_ttl(Duration::from_millis(40));
        cache.store("proxmox.lan", addrs());
        std::thread::sleep(Duration::from_millis(25));
        cache.store("proxmox.lan", addrs());
        std::thread::sleep(Duration::from_millis(25));
        // 50ms after first store, 25ms after the refresh.
        assert!(cache.fresh("proxmox.lan").is_some());
    }
}
