//! Per-address transport seam
//!
//! A transport is bound to exactly one `(endpoint, address)` pair: it always
//! connects to its literal address while presenting the endpoint's original
//! hostname for virtual-host routing and TLS validation. The trait exists so
//! the failover algorithm can be tested with scripted transports.

pub mod hyper;

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::Request;

use crate::error::Result;
use crate::http::HttpResponse;

pub use self::hyper::HyperFactory;

/// One concrete candidate for an endpoint: which literal address to dial and
/// which hostname to present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportTarget {
    /// Original hostname, used as Host header and TLS server name.
    pub hostname: String,
    /// The literal address to connect to.
    pub addr: SocketAddr,
    /// Whether to wrap the connection in TLS.
    pub tls: bool,
    /// Skip certificate validation (self-signed monitoring targets).
    pub accept_invalid_certs: bool,
}

/// A transport bound to a single candidate address.
pub trait AddressTransport: Send + Sync {
    /// Execute one request against this transport's address.
    fn send<'a>(&'a self, req: Request<Bytes>) -> BoxFuture<'a, Result<HttpResponse>>;
}

/// Creates transports on first use of an address; the client caches the
/// result for its lifetime.
pub trait TransportFactory: Send + Sync {
    fn transport(&self, target: &TransportTarget) -> Result<Arc<dyn AddressTransport>>;
}
