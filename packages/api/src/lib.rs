//! # vigil
//!
//! Resilient, DNS-aware HTTP client for monitoring targets whose hostname
//! may resolve to several addresses, flap between them, or go temporarily
//! unreachable.
//!
//! Resolution results are cached with a bounded TTL (stale entries survive
//! as a degraded fallback), addresses that fail with connection-class errors
//! are quarantined for a fixed window, and each request fails over
//! sequentially across candidates, sticky toward the last known-good
//! address.
//!
//! ## Usage
//!
//! ```no_run
//! use vigil::ClientBuilder;
//!
//! # async fn run() -> vigil::Result<()> {
//! let client = ClientBuilder::new()
//!     .url("https://proxmox.lan:8006")?
//!     .danger_accept_invalid_certs(true)
//!     .bearer_token("root@pam!monitor=secret")?
//!     .build();
//!
//! let version = client.get("/api2/json/version", Default::default()).await?;
//! println!("{}", version.text());
//! # Ok(())
//! # }
//! ```
//!
//! Multiple endpoints can share one [`Resolver`] so they see the same DNS
//! cache and quarantine state:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil::{ClientBuilder, Resolver};
//!
//! # fn run() -> vigil::Result<()> {
//! let resolver = Arc::new(Resolver::new());
//! let pve = ClientBuilder::new()
//!     .url("https://proxmox.lan:8006")?
//!     .resolver(Arc::clone(&resolver))
//!     .build();
//! let pbs = ClientBuilder::new()
//!     .url("https://pbs.lan:8007")?
//!     .resolver(resolver)
//!     .build();
//! # let _ = (pve, pbs);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;

pub use builder::ClientBuilder;
pub use vigil_client::{
    extract_hostname, AddressHealthTracker, AuthHook, BearerAuth, CacheStats, ClientConfig,
    Error, FailoverClient, HttpResponse, Kind, Lookup, RequestOptions, Resolver, Result,
    Scheme, TargetConfig,
};
