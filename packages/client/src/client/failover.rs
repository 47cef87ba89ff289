//! Failover request execution
//!
//! Candidate addresses are tried strictly sequentially, sticky toward the
//! last known-good address. Connection-class failures quarantine the address
//! and advance to the next candidate; any HTTP response, including a non-2xx
//! status, ends the attempt loop immediately.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use dashmap::DashMap;
use http::header::{HeaderValue, HOST};
use http::{Method, Request, Uri};

use crate::client::auth::AuthHook;
use crate::client::config::ClientConfig;
use crate::dns::Resolver;
use crate::error::{constructors, Result};
use crate::health::AddressHealthTracker;
use crate::http::{HttpResponse, RequestOptions};
use crate::transport::{AddressTransport, HyperFactory, TransportFactory, TransportTarget};

/// HTTP client for one logical endpoint with DNS-aware address failover.
///
/// Owns exactly one transport per candidate address, created lazily and kept
/// for the client's lifetime; quarantine never tears a transport down, reuse
/// resumes once the window elapses.
///
/// There is no overall deadline across candidate attempts, only the
/// per-attempt timeout; callers wanting a total ceiling must enforce it
/// around [`request`](Self::request).
pub struct FailoverClient {
    config: ClientConfig,
    resolver: Arc<Resolver>,
    health: Arc<AddressHealthTracker>,
    factory: Arc<dyn TransportFactory>,
    transports: DashMap<IpAddr, Arc<dyn AddressTransport>>,
    last_good: Mutex<Option<IpAddr>>,
    auth: Option<Arc<dyn AuthHook>>,
}

impl FailoverClient {
    /// Client with its own resolver and the production hyper transport.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, Arc::new(Resolver::new()))
    }

    /// Client sharing `resolver` (and its cache and health tracker) with
    /// other endpoints.
    #[must_use]
    pub fn with_resolver(config: ClientConfig, resolver: Arc<Resolver>) -> Self {
        Self::with_parts(config, resolver, Arc::new(HyperFactory::new()))
    }

    /// Fully injected constructor; tests use scripted transport factories.
    #[must_use]
    pub fn with_parts(
        config: ClientConfig,
        resolver: Arc<Resolver>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let health = resolver.health();
        Self {
            config,
            resolver,
            health,
            factory,
            transports: DashMap::new(),
            last_good: Mutex::new(None),
            auth: None,
        }
    }

    /// Install a per-attempt authentication hook.
    #[must_use]
    pub fn auth_hook(mut self, hook: Arc<dyn AuthHook>) -> Self {
        self.auth = Some(hook);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The most recently successful address, if any.
    #[must_use]
    pub fn last_good(&self) -> Option<IpAddr> {
        *self
            .last_good
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute `method path` with automatic address failover.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        opts: RequestOptions,
    ) -> Result<HttpResponse> {
        let hostname = self.config.hostname.as_str();
        let addrs = self.resolver.resolve(hostname).await?;
        if addrs.is_empty() {
            return Err(constructors::no_addresses(hostname));
        }
        let addrs = self.prefer_last_good(addrs);

        // Skipping quarantined candidates must never empty the attempt set;
        // when everything is quarantined, attempt the list as-is (fail-open).
        let any_healthy = addrs.iter().any(|addr| !self.health.is_failed(*addr));

        let mut last_err = None;
        for addr in addrs {
            if any_healthy && self.health.is_failed(addr) {
                tracing::debug!(hostname, %addr, "skipping quarantined address");
                continue;
            }

            let transport = self.transport_for(addr)?;
            let req = self.build_request(&method, path, &opts).await?;
            let sock = SocketAddr::new(addr, self.config.port);

            let timeout = opts.timeout.unwrap_or(self.config.attempt_timeout);
            let result = match tokio::time::timeout(timeout, transport.send(req)).await {
                Ok(result) => result,
                Err(_) => Err(constructors::timeout(sock)),
            };

            match result {
                Ok(resp) => {
                    // Any response counts as a live address, even an error
                    // status; only the transport decides health.
                    tracing::debug!(hostname, %addr, status = %resp.status, "attempt succeeded");
                    *self
                        .last_good
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(addr);
                    return Ok(resp);
                }
                Err(err) => {
                    if err.is_connection_class() {
                        self.health.mark_failed(addr);
                        tracing::warn!(hostname, %addr, %err, "attempt failed, trying next address");
                    } else {
                        tracing::warn!(
                            hostname, %addr, %err,
                            "attempt failed without quarantining, trying next address"
                        );
                    }
                    last_err = Some(err);
                }
            }
        }

        tracing::warn!(hostname, "all candidate addresses failed");
        Err(constructors::all_addresses_failed(hostname, last_err))
    }

    pub async fn get(&self, path: &str, opts: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::GET, path, opts).await
    }

    pub async fn post(&self, path: &str, opts: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::POST, path, opts).await
    }

    pub async fn put(&self, path: &str, opts: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PUT, path, opts).await
    }

    pub async fn delete(&self, path: &str, opts: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::DELETE, path, opts).await
    }

    pub async fn patch(&self, path: &str, opts: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PATCH, path, opts).await
    }

    /// Stable reorder: the last known-good address moves to the front, the
    /// rest keep resolution order. Never excludes a candidate.
    fn prefer_last_good(&self, mut addrs: Vec<IpAddr>) -> Vec<IpAddr> {
        let last = self.last_good();
        if let Some(last) = last {
            if let Some(pos) = addrs.iter().position(|addr| *addr == last) {
                let addr = addrs.remove(pos);
                addrs.insert(0, addr);
            }
        }
        addrs
    }

    fn transport_for(&self, addr: IpAddr) -> Result<Arc<dyn AddressTransport>> {
        if let Some(existing) = self.transports.get(&addr) {
            return Ok(Arc::clone(existing.value()));
        }
        let target = TransportTarget {
            hostname: self.config.hostname.clone(),
            addr: SocketAddr::new(addr, self.config.port),
            tls: self.config.scheme.is_tls(),
            accept_invalid_certs: self.config.danger_accept_invalid_certs,
        };
        let transport = self.factory.transport(&target)?;
        // A concurrent insert for the same address wins arbitrarily; both
        // transports are equivalent and the map keeps exactly one.
        Ok(self
            .transports
            .entry(addr)
            .or_insert(transport)
            .value()
            .clone())
    }

    /// Build the outgoing request: origin-form URI, merged headers, Host set
    /// to the original hostname, auth hook applied last.
    async fn build_request(
        &self,
        method: &Method,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<Request<Bytes>> {
        let path = if path.is_empty() { "/" } else { path };
        let uri: Uri = path.parse().map_err(constructors::builder)?;

        let req = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(())
            .map_err(constructors::builder)?;
        let (mut parts, ()) = req.into_parts();

        for (name, value) in &self.config.default_headers {
            parts.headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &opts.headers {
            parts.headers.insert(name.clone(), value.clone());
        }
        parts.headers.insert(HOST, self.host_value()?);

        if let Some(auth) = &self.auth {
            auth.apply(&mut parts).await?;
        }

        let body = opts.body.clone().unwrap_or_default();
        Ok(Request::from_parts(parts, body))
    }

    fn host_value(&self) -> Result<HeaderValue> {
        let host = if self.config.hostname.contains(':') {
            format!("[{}]:{}", self.config.hostname, self.config.port)
        } else {
            self.config.endpoint()
        };
        HeaderValue::from_str(&host).map_err(constructors::builder)
    }
}

impl std::fmt::Debug for FailoverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverClient")
            .field("endpoint", &self.config.endpoint())
            .field("scheme", &self.config.scheme)
            .field("last_good", &self.last_good())
            .finish_non_exhaustive()
    }
}
