//! Underlying DNS lookup trait and its hickory-resolver implementation

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use hickory_resolver::TokioResolver;
use once_cell::sync::OnceCell;

use crate::error::{constructors, Result};

/// Per-family and system DNS lookups, separated so the resolver's strategy
/// chain can be exercised in tests without touching the network.
pub trait Lookup: Send + Sync {
    /// Resolve IPv4 (A) records for `hostname`.
    fn lookup_a<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>>;

    /// Resolve IPv6 (AAAA) records for `hostname`.
    fn lookup_aaaa<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>>;

    /// Resolve via the system resolver (both families combined).
    fn lookup_system<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>>;
}

/// Production [`Lookup`] backed by [`hickory_resolver`], with the system
/// resolver as the combined fallback path.
///
/// The hickory resolver is constructed lazily on first use; reading the
/// system configuration is deferred until a lookup actually happens.
#[derive(Default, Clone)]
pub struct HickoryLookup {
    state: Arc<OnceCell<TokioResolver>>,
}

impl HickoryLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolver(&self) -> Result<&TokioResolver> {
        self.state.get_or_try_init(|| {
            let builder = TokioResolver::builder_tokio()
                .map_err(constructors::builder)?;
            Ok(builder.build())
        })
    }
}

impl fmt::Debug for HickoryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HickoryLookup")
            .field("initialized", &self.state.get().is_some())
            .finish()
    }
}

impl Lookup for HickoryLookup {
    fn lookup_a<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move {
            let resolver = self.resolver()?;
            let lookup = resolver
                .ipv4_lookup(hostname)
                .await
                .map_err(|e| constructors::lookup(hostname, e))?;
            Ok(lookup.iter().map(|a| IpAddr::V4(a.0)).collect())
        }
        .boxed()
    }

    fn lookup_aaaa<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move {
            let resolver = self.resolver()?;
            let lookup = resolver
                .ipv6_lookup(hostname)
                .await
                .map_err(|e| constructors::lookup(hostname, e))?;
            Ok(lookup.iter().map(|aaaa| IpAddr::V6(aaaa.0)).collect())
        }
        .boxed()
    }

    fn lookup_system<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move {
            // Port 0 is a placeholder; only the addresses are kept.
            let addrs = tokio::net::lookup_host((hostname, 0u16))
                .await
                .map_err(|e| constructors::lookup(hostname, e))?;
            Ok(addrs.map(|sa| sa.ip()).collect())
        }
        .boxed()
    }
}
