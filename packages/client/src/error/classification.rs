use std::error::Error as StdError;
use std::io;

use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error came from client configuration.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if hostname resolution failed with no fallback.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self.inner.kind, Kind::Resolution)
    }

    /// Returns true if resolution yielded zero candidate addresses.
    #[must_use]
    pub fn is_no_addresses(&self) -> bool {
        matches!(self.inner.kind, Kind::NoAddresses)
    }

    /// Returns true if every candidate address was attempted and failed.
    #[must_use]
    pub fn is_all_addresses_failed(&self) -> bool {
        matches!(self.inner.kind, Kind::AllAddressesFailed)
    }

    /// Returns true if the error is related to establishing a connection.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.inner.kind, Kind::Connect)
    }

    /// Returns true if the per-attempt timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.inner.kind, Kind::Timeout) {
            return true;
        }

        let mut source = self.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the error came from the TLS layer.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self.inner.kind, Kind::Tls)
    }

    /// Returns true if the error came from decoding a response body.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.inner.kind, Kind::Decode)
    }

    /// Returns true for transport failures that indicate the *address*
    /// is unhealthy: connection refused, per-attempt timeout, or an
    /// unreachable host/network.
    ///
    /// This is the single predicate deciding which failures quarantine an
    /// address. TLS and protocol errors deliberately fall outside it: the
    /// failover loop still advances past them, but the address is not
    /// marked failed.
    #[must_use]
    pub fn is_connection_class(&self) -> bool {
        match self.inner.kind {
            Kind::Timeout => true,
            Kind::Connect => {
                // A Connect kind is raised for any connect() failure; only the
                // enumerable refused/timeout/unreachable set counts.
                let mut source = self.source();
                while let Some(err) = source {
                    if let Some(io) = err.downcast_ref::<io::Error>() {
                        return io_is_connection_class(io);
                    }
                    source = err.source();
                }
                // No io::Error in the chain, e.g. a scripted test failure.
                true
            }
            _ => false,
        }
    }
}

fn io_is_connection_class(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::TimedOut
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
    )
}

#[cfg(test)]
mod tests {
    use super::super::constructors;
    use std::io;

    #[test]
    fn refused_is_connection_class() {
        let addr = "10.0.0.1:8006".parse().unwrap();
        let err = constructors::connect(
            addr,
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert!(err.is_connect());
        assert!(err.is_connection_class());
    }

    #[test]
    fn timeout_is_connection_class() {
        let addr = "10.0.0.1:8006".parse().unwrap();
        let err = constructors::timeout(addr);
        assert!(err.is_timeout());
        assert!(err.is_connection_class());
    }

    #[test]
    fn tls_is_not_connection_class() {
        let addr = "10.0.0.1:8006".parse().unwrap();
        let err = constructors::tls(addr, io::Error::other("bad certificate"));
        assert!(err.is_tls());
        assert!(!err.is_connection_class());
    }

    #[test]
    fn unreachable_io_error_is_connection_class() {
        let addr = "10.0.0.1:8006".parse().unwrap();
        let err = constructors::connect(
            addr,
            io::Error::new(io::ErrorKind::HostUnreachable, "no route to host"),
        );
        assert!(err.is_connection_class());
    }

    #[test]
    fn other_connect_io_error_is_not_connection_class() {
        let addr = "10.0.0.1:8006".parse().unwrap();
        let err = constructors::connect(
            addr,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_connection_class());
    }
}
