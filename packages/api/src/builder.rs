//! Fluent construction of [`FailoverClient`]s

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use url::Url;

use vigil_client::{
    AuthHook, BearerAuth, ClientConfig, Error, FailoverClient, Resolver, Result, Scheme,
    TargetConfig,
};

/// Fluent builder over [`ClientConfig`] plus the shared pieces a client can
/// be constructed with (resolver, auth hook).
#[derive(Default)]
pub struct ClientBuilder {
    scheme: Scheme,
    hostname: Option<String>,
    port: Option<u16>,
    config: Vec<ConfigStep>,
    resolver: Option<Arc<Resolver>>,
    auth: Option<Arc<dyn AuthHook>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("scheme", &self.scheme)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

enum ConfigStep {
    Header(HeaderName, HeaderValue),
    AcceptInvalidCerts(bool),
    AttemptTimeout(Duration),
}

impl ClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take scheme, hostname and port from a URL.
    pub fn url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| builder_error(e.to_string()))?;
        self.scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(builder_error(format!("unsupported scheme {other}"))),
        };
        let host = parsed
            .host_str()
            .ok_or_else(|| builder_error(format!("no host in {url}")))?;
        self.hostname = Some(host.trim_matches(&['[', ']'][..]).to_string());
        self.port = parsed.port_or_known_default();
        Ok(self)
    }

    #[must_use]
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Add a default header sent with every request.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.push(ConfigStep::Header(name, value));
        self
    }

    /// Accept self-signed certificates.
    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.push(ConfigStep::AcceptInvalidCerts(accept));
        self
    }

    /// Per-attempt timeout (default 30s).
    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.push(ConfigStep::AttemptTimeout(timeout));
        self
    }

    /// Share a resolver (DNS cache + quarantine state) with other clients.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Install a per-attempt authentication hook.
    #[must_use]
    pub fn auth_hook(mut self, hook: Arc<dyn AuthHook>) -> Self {
        self.auth = Some(hook);
        self
    }

    /// Authenticate every attempt with a static bearer token.
    pub fn bearer_token(self, token: &str) -> Result<Self> {
        let hook = BearerAuth::new(token)?;
        Ok(self.auth_hook(Arc::new(hook)))
    }

    /// Populate the builder from a deserialized target definition.
    pub fn target(self, target: &TargetConfig) -> Result<Self> {
        let builder = self
            .scheme(target.scheme)
            .hostname(target.hostname.clone())
            .port(target.port)
            .danger_accept_invalid_certs(!target.verify_tls);
        match &target.token {
            Some(token) => builder.bearer_token(token),
            None => Ok(builder),
        }
    }

    /// Build the client. A missing hostname falls back to `localhost`; a
    /// missing port falls back to the scheme default.
    #[must_use]
    pub fn build(self) -> FailoverClient {
        let hostname = self.hostname.unwrap_or_else(|| "localhost".to_string());
        let port = self.port.unwrap_or(match self.scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        });

        let mut config = ClientConfig::new(self.scheme, hostname, port);
        for step in self.config {
            config = match step {
                ConfigStep::Header(name, value) => config.header(name, value),
                ConfigStep::AcceptInvalidCerts(accept) => {
                    config.danger_accept_invalid_certs(accept)
                }
                ConfigStep::AttemptTimeout(timeout) => config.attempt_timeout(timeout),
            };
        }
        tracing::debug!(endpoint = %config.endpoint(), scheme = config.scheme.as_str(), "building client");

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(Resolver::new()));
        let client = FailoverClient::with_resolver(config, resolver);
        match self.auth {
            Some(auth) => client.auth_hook(auth),
            None => client,
        }
    }
}

fn builder_error(msg: String) -> Error {
    use std::io;
    Error::builder_failure(io::Error::new(io::ErrorKind::InvalidInput, msg))
}
