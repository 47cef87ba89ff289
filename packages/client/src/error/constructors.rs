//! Crate-private constructors keeping error creation uniform across modules.

use std::error::Error as StdError;
use std::net::SocketAddr;

use super::types::{Error, Kind};

type BoxError = Box<dyn StdError + Send + Sync>;

pub(crate) fn builder<E: Into<BoxError>>(source: E) -> Error {
    Error::builder_failure(source)
}

pub(crate) fn resolution_failed(hostname: &str) -> Error {
    Error::new(Kind::Resolution).with_hostname(hostname)
}

pub(crate) fn lookup<E: Into<BoxError>>(hostname: &str, source: E) -> Error {
    Error::new(Kind::Resolution).with_hostname(hostname).with(source)
}

pub(crate) fn no_addresses(hostname: &str) -> Error {
    Error::new(Kind::NoAddresses).with_hostname(hostname)
}

pub(crate) fn all_addresses_failed(hostname: &str, last: Option<Error>) -> Error {
    let err = Error::new(Kind::AllAddressesFailed).with_hostname(hostname);
    match last {
        Some(last) => err.with(last),
        None => err,
    }
}

pub(crate) fn connect<E: Into<BoxError>>(addr: SocketAddr, source: E) -> Error {
    Error::connect_failure(addr, source)
}

pub(crate) fn timeout(addr: SocketAddr) -> Error {
    Error::attempt_timeout(addr)
}

pub(crate) fn tls<E: Into<BoxError>>(addr: SocketAddr, source: E) -> Error {
    Error::tls_failure(addr, source)
}

pub(crate) fn request<E: Into<BoxError>>(addr: SocketAddr, source: E) -> Error {
    Error::request_failure(addr, source)
}

pub(crate) fn body<E: Into<BoxError>>(source: E) -> Error {
    Error::new(Kind::Body).with(source)
}

pub(crate) fn decode<E: Into<BoxError>>(source: E) -> Error {
    Error::new(Kind::Decode).with(source)
}
