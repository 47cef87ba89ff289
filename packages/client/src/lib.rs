//! # vigil_client
//!
//! Resilient, DNS-aware HTTP client layer for reaching monitoring targets
//! (virtualization hosts, backup servers) whose hostname may resolve to
//! several addresses, flap between them, or go temporarily dark.
//!
//! The layer resolves a hostname to ordered candidate addresses, caches
//! resolutions with a bounded TTL (stale entries survive as a degraded
//! fallback), quarantines addresses after connection-class failures, and
//! executes requests with sequential failover sticky toward the last
//! known-good address.
//!
//! ## Usage
//!
//! ```no_run
//! use vigil_client::{ClientConfig, FailoverClient, RequestOptions, Scheme};
//!
//! # async fn run() -> vigil_client::Result<()> {
//! let config = ClientConfig::new(Scheme::Https, "proxmox.lan", 8006)
//!     .danger_accept_invalid_certs(true);
//! let client = FailoverClient::new(config);
//!
//! let resp = client.get("/api2/json/version", RequestOptions::new()).await?;
//! println!("{}", resp.text());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod dns;
pub mod error;
pub mod health;
pub mod http;
pub mod tls;
pub mod transport;

pub use client::{
    AuthHook, BearerAuth, ClientConfig, FailoverClient, Scheme, TargetConfig,
    DEFAULT_ATTEMPT_TIMEOUT,
};
pub use dns::{extract_hostname, CacheStats, DnsCache, HickoryLookup, Lookup, Resolver};
pub use error::{Error, Kind, Result};
pub use health::{AddressHealthTracker, DEFAULT_QUARANTINE};
pub use http::{HttpResponse, RequestOptions};
pub use transport::{AddressTransport, TransportFactory, TransportTarget};
