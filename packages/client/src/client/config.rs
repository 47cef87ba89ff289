//! Base request configuration for one logical endpoint

use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Deserialize;

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    #[must_use]
    pub fn is_tls(self) -> bool {
        matches!(self, Scheme::Https)
    }
}

/// Base configuration for a [`FailoverClient`](crate::client::FailoverClient):
/// the logical endpoint plus connection policy shared by every request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub scheme: Scheme,
    pub hostname: String,
    pub port: u16,
    /// Headers applied to every request; per-request headers win on collision.
    pub default_headers: HeaderMap,
    /// Accept self-signed certificates (common on monitoring targets).
    pub danger_accept_invalid_certs: bool,
    /// Timeout applied to each per-address attempt, not the whole call.
    pub attempt_timeout: Duration,
}

impl ClientConfig {
    #[must_use]
    pub fn new(scheme: Scheme, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            hostname: hostname.into(),
            port,
            default_headers: HeaderMap::new(),
            danger_accept_invalid_certs: false,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Add a default header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Accept invalid TLS certificates.
    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Override the per-attempt timeout.
    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// `hostname:port`, the logical endpoint key.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// Environment-style definition of one monitoring target, as deserialized
/// from configuration. Loading and validation stay with the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub hostname: String,
    pub port: u16,
    #[serde(default)]
    pub scheme: Scheme,
    /// When false, certificate validation is skipped.
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Static API token, sent as a bearer credential when present.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_true() -> bool {
    true
}

impl TargetConfig {
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.scheme, self.hostname.clone(), self.port)
            .danger_accept_invalid_certs(!self.verify_tls)
    }
}
