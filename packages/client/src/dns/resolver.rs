//! Resolution orchestration: cache, dual-family lookup, fallbacks, filtering
//!
//! The fallback policy is an explicit ordered chain rather than nested
//! conditionals, so each strategy can be observed and tested in isolation:
//!
//! 1. fresh cache entry (no lookup performed)
//! 2. dual-family lookup, A then AAAA, per-family errors ignored
//! 3. system resolver (combined families)
//! 4. stale cache entry, logged as degraded
//! 5. `Resolution` error

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::dns::cache::{CacheStats, DnsCache};
use crate::dns::lookup::{HickoryLookup, Lookup};
use crate::error::{constructors, Result};
use crate::health::AddressHealthTracker;

/// Resolves hostnames to ordered candidate addresses, filtered against the
/// shared [`AddressHealthTracker`].
///
/// One resolver instance is meant to be shared (via `Arc`) by every client
/// in the process so all endpoints see the same cache and quarantine state.
pub struct Resolver {
    cache: DnsCache,
    health: Arc<AddressHealthTracker>,
    lookup: Arc<dyn Lookup>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("cache", &self.cache)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Resolver with the production hickory/system lookup and default
    /// TTL and quarantine windows.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(HickoryLookup::new()))
    }

    /// Resolver with a caller-supplied lookup implementation.
    #[must_use]
    pub fn with_lookup(lookup: Arc<dyn Lookup>) -> Self {
        Self {
            cache: DnsCache::new(),
            health: Arc::new(AddressHealthTracker::new()),
            lookup,
        }
    }

    /// Resolver with custom cache TTL and quarantine windows, for tests and
    /// unusual deployments.
    #[must_use]
    pub fn with_windows(lookup: Arc<dyn Lookup>, ttl: Duration, quarantine: Duration) -> Self {
        Self {
            cache: DnsCache::with_ttl(ttl),
            health: Arc::new(AddressHealthTracker::with_quarantine(quarantine)),
            lookup,
        }
    }

    /// The health tracker shared with clients marking failures.
    #[must_use]
    pub fn health(&self) -> Arc<AddressHealthTracker> {
        Arc::clone(&self.health)
    }

    /// Cache hit/miss counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolve `hostname` to an ordered list of candidate addresses.
    ///
    /// Quarantined addresses are filtered out unless that would leave the
    /// list empty; then the unfiltered list is returned so a wrong
    /// quarantine can never block all connectivity (fail-open).
    pub async fn resolve(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        // Literal addresses bypass cache and lookup entirely.
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        if let Some(addrs) = self.cache.fresh(hostname) {
            return Ok(self.filter_quarantined(hostname, addrs));
        }

        if let Some(addrs) = self.dual_family(hostname).await {
            tracing::debug!(hostname, ?addrs, "resolved via dual-family lookup");
            self.cache.store(hostname, addrs.clone());
            return Ok(self.filter_quarantined(hostname, addrs));
        }

        if let Some(addrs) = self.system(hostname).await {
            tracing::debug!(hostname, ?addrs, "resolved via system resolver");
            self.cache.store(hostname, addrs.clone());
            return Ok(self.filter_quarantined(hostname, addrs));
        }

        if let Some(addrs) = self.cache.stale(hostname) {
            tracing::warn!(hostname, ?addrs, "resolution failed, serving stale cache entry");
            return Ok(self.filter_quarantined(hostname, addrs));
        }

        tracing::warn!(hostname, "resolution failed with no fallback");
        Err(constructors::resolution_failed(hostname))
    }

    /// A records first, then AAAA, concatenated. A failure in one family
    /// does not discard the other family's answers.
    async fn dual_family(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        let mut addrs = Vec::new();

        match self.lookup.lookup_a(hostname).await {
            Ok(mut v4) => addrs.append(&mut v4),
            Err(err) => tracing::debug!(hostname, %err, "A lookup failed"),
        }
        match self.lookup.lookup_aaaa(hostname).await {
            Ok(mut v6) => addrs.append(&mut v6),
            Err(err) => tracing::debug!(hostname, %err, "AAAA lookup failed"),
        }

        (!addrs.is_empty()).then_some(addrs)
    }

    async fn system(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        match self.lookup.lookup_system(hostname).await {
            Ok(addrs) if !addrs.is_empty() => Some(addrs),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(hostname, %err, "system resolver failed");
                None
            }
        }
    }

    fn filter_quarantined(&self, hostname: &str, addrs: Vec<IpAddr>) -> Vec<IpAddr> {
        let healthy: Vec<IpAddr> = addrs
            .iter()
            .copied()
            .filter(|addr| !self.health.is_failed(*addr))
            .collect();

        if healthy.is_empty() && !addrs.is_empty() {
            tracing::warn!(
                hostname,
                ?addrs,
                "all candidates quarantined, failing open with unfiltered list"
            );
            return addrs;
        }
        healthy
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
