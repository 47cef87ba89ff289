use std::error::Error as StdError;
use std::fmt;
use std::net::SocketAddr;

/// A `Result` alias where the `Err` case is `vigil_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur resolving a target or executing a
/// request against its candidate addresses.
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
    /// Hostname of the logical endpoint this error belongs to.
    pub(crate) hostname: Option<String>,
    /// The candidate address being attempted, when the error is per-address.
    pub(crate) addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid client configuration.
    Builder,
    /// No addresses obtainable and no stale cache entry to fall back on.
    Resolution,
    /// Resolution returned zero addresses with nothing cached.
    NoAddresses,
    /// Every candidate address was attempted and failed.
    AllAddressesFailed,
    /// TCP connection establishment failure.
    Connect,
    /// Per-attempt timeout elapsed.
    Timeout,
    /// TLS handshake or certificate failure.
    Tls,
    /// Request could not be sent or the response could not be read.
    Request,
    /// Failure while collecting the response body.
    Body,
    /// Failure decoding a response body (e.g. JSON).
    Decode,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                hostname: None,
                addr: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub(crate) fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub(crate) fn with_hostname(mut self, hostname: impl Into<String>) -> Error {
        self.inner.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub(crate) fn with_addr(mut self, addr: SocketAddr) -> Error {
        self.inner.addr = Some(addr);
        self
    }

    /// The kind of this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// Hostname of the logical endpoint this error belongs to, if known.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.inner.hostname.as_deref()
    }

    /// The candidate address being attempted when this error occurred.
    #[must_use]
    pub fn addr(&self) -> Option<SocketAddr> {
        self.inner.addr
    }
}

/// Constructors for [`AddressTransport`](crate::transport::AddressTransport)
/// implementations outside this crate.
impl Error {
    /// An invalid-configuration error.
    #[must_use]
    pub fn builder_failure<E>(source: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::new(Kind::Builder).with(source)
    }

    /// A TCP connection establishment failure against `addr`.
    #[must_use]
    pub fn connect_failure<E>(addr: SocketAddr, source: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::new(Kind::Connect).with_addr(addr).with(source)
    }

    /// The per-attempt timeout elapsed while talking to `addr`.
    #[must_use]
    pub fn attempt_timeout(addr: SocketAddr) -> Error {
        Error::new(Kind::Timeout).with_addr(addr)
    }

    /// A TLS handshake or certificate failure against `addr`.
    #[must_use]
    pub fn tls_failure<E>(addr: SocketAddr, source: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::new(Kind::Tls).with_addr(addr).with(source)
    }

    /// The request could not be completed against `addr`.
    #[must_use]
    pub fn request_failure<E>(addr: SocketAddr, source: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::new(Kind::Request).with_addr(addr).with(source)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("vigil_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref hostname) = self.inner.hostname {
            f.field("hostname", hostname);
        }

        if let Some(ref addr) = self.inner.addr {
            f.field("addr", addr);
        }

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Builder => f.write_str("builder error")?,
            Kind::Resolution => f.write_str("hostname resolution failed")?,
            Kind::NoAddresses => f.write_str("no addresses available")?,
            Kind::AllAddressesFailed => f.write_str("all candidate addresses failed")?,
            Kind::Connect => f.write_str("connection error")?,
            Kind::Timeout => f.write_str("attempt timed out")?,
            Kind::Tls => f.write_str("TLS error")?,
            Kind::Request => f.write_str("error sending request")?,
            Kind::Body => f.write_str("error reading response body")?,
            Kind::Decode => f.write_str("error decoding response body")?,
        }

        if let Some(ref hostname) = self.inner.hostname {
            write!(f, " for {hostname}")?;
        }

        if let Some(ref addr) = self.inner.addr {
            write!(f, " ({addr})")?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
