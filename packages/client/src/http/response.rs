//! Materialized HTTP response
//!
//! Responses are returned fully collected: the callers here poll small
//! monitoring APIs, not streams. Status, headers and body pass through
//! uninterpreted.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

use crate::error::{constructors, Result};

/// A complete HTTP response plus the candidate address that served it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub version: Version,
    /// The literal address that answered, for diagnostics.
    pub remote_addr: Option<SocketAddr>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Response body as UTF-8, lossily converted.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(constructors::decode)
    }
}
