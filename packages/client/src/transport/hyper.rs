//! hyper-backed transport pinned to one literal address
//!
//! Connects over TCP to the candidate address, optionally wraps the stream
//! in TLS with the endpoint's original hostname as server name, and speaks
//! HTTP/1.1 over a single cached connection. A closed connection is
//! re-established on the next send; quarantine never tears a transport down.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use once_cell::sync::OnceCell;
use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_rustls::TlsConnector;

use super::{AddressTransport, TransportFactory, TransportTarget};
use crate::error::{constructors, Result};
use crate::http::HttpResponse;
use crate::tls;

pub struct HyperTransport {
    target: TransportTarget,
    tls: Option<(TlsConnector, ServerName<'static>)>,
    conn: Mutex<Option<SendRequest<Full<Bytes>>>>,
}

impl HyperTransport {
    async fn connect(&self) -> Result<SendRequest<Full<Bytes>>> {
        let addr = self.target.addr;
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| constructors::connect(addr, e))?;
        let _ = stream.set_nodelay(true);

        match &self.tls {
            Some((connector, server_name)) => {
                let stream = connector
                    .connect(server_name.clone(), stream)
                    .await
                    .map_err(|e| constructors::tls(addr, e))?;
                let (sender, conn) = http1::handshake(TokioIo::new(stream))
                    .await
                    .map_err(|e| constructors::request(addr, e))?;
                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        tracing::debug!(%addr, %err, "connection closed with error");
                    }
                });
                Ok(sender)
            }
            None => {
                let (sender, conn) = http1::handshake(TokioIo::new(stream))
                    .await
                    .map_err(|e| constructors::request(addr, e))?;
                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        tracing::debug!(%addr, %err, "connection closed with error");
                    }
                });
                Ok(sender)
            }
        }
    }
}

impl AddressTransport for HyperTransport {
    fn send<'a>(&'a self, req: Request<Bytes>) -> BoxFuture<'a, Result<HttpResponse>> {
        async move {
            let (parts, body) = req.into_parts();
            let req = Request::from_parts(parts, Full::new(body));

            // One in-flight request per connection; the lock spans the whole
            // exchange so a concurrent caller waits rather than interleaving
            // on the same HTTP/1.1 stream.
            let mut guard = self.conn.lock().await;
            let mut sender = match guard.take() {
                Some(sender) if !sender.is_closed() => sender,
                _ => self.connect().await?,
            };

            let resp = sender
                .send_request(req)
                .await
                .map_err(|e| constructors::request(self.target.addr, e))?;

            let (parts, body) = resp.into_parts();
            let body = body
                .collect()
                .await
                .map_err(constructors::body)?
                .to_bytes();

            *guard = Some(sender);

            Ok(HttpResponse {
                status: parts.status,
                headers: parts.headers,
                body,
                version: parts.version,
                remote_addr: Some(self.target.addr),
            })
        }
        .boxed()
    }
}

/// Default factory producing [`HyperTransport`] instances. TLS client
/// configs are built once and shared across all transports.
#[derive(Default)]
pub struct HyperFactory {
    verified: OnceCell<Arc<ClientConfig>>,
    trust_all: OnceCell<Arc<ClientConfig>>,
}

impl HyperFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tls_config(&self, accept_invalid_certs: bool) -> Result<Arc<ClientConfig>> {
        let cell = if accept_invalid_certs {
            &self.trust_all
        } else {
            &self.verified
        };
        cell.get_or_try_init(|| tls::client_config(accept_invalid_certs))
            .map(Arc::clone)
    }
}

impl TransportFactory for HyperFactory {
    fn transport(&self, target: &TransportTarget) -> Result<Arc<dyn AddressTransport>> {
        let tls = if target.tls {
            let config = self.tls_config(target.accept_invalid_certs)?;
            let server_name = ServerName::try_from(target.hostname.clone())
                .map_err(constructors::builder)?;
            Some((TlsConnector::from(config), server_name))
        } else {
            None
        };

        Ok(Arc::new(HyperTransport {
            target: target.clone(),
            tls,
            conn: Mutex::new(None),
        }))
    }
}
