//! Failover behavior against scripted transports and a static lookup.
//!
//! No network is involved: resolution is a fixed address list and each
//! per-address transport replays a scripted outcome sequence.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Request, StatusCode, Version};

use vigil_client::{
    AddressTransport, AuthHook, ClientConfig, FailoverClient, HttpResponse, Lookup,
    RequestOptions, Resolver, Result, Scheme, TransportFactory, TransportTarget,
};

fn v4(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

/// Lookup answering a fixed A-record list.
struct StaticLookup(Vec<IpAddr>);

impl Lookup for StaticLookup {
    fn lookup_a<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move { Ok(self.0.clone()) }.boxed()
    }

    fn lookup_aaaa<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move { Ok(Vec::new()) }.boxed()
    }

    fn lookup_system<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move { Ok(Vec::new()) }.boxed()
    }
}

#[derive(Clone)]
enum Step {
    /// Answer with the given status.
    Respond(StatusCode),
    /// Connection-class failure.
    Refuse,
    /// Non-connection failure (TLS/protocol class).
    Protocol,
    /// Never answer; only the per-attempt timeout ends this step.
    Hang,
}

struct ScriptedTransport {
    addr: SocketAddr,
    steps: Mutex<VecDeque<Step>>,
    attempts: Arc<Mutex<Vec<IpAddr>>>,
}

impl AddressTransport for ScriptedTransport {
    fn send<'a>(&'a self, _req: Request<Bytes>) -> BoxFuture<'a, Result<HttpResponse>> {
        async move {
            self.attempts.lock().unwrap().push(self.addr.ip());
            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Respond(StatusCode::OK));
            match step {
                Step::Respond(status) => Ok(HttpResponse {
                    status,
                    headers: HeaderMap::new(),
                    body: Bytes::from_static(b"{}"),
                    version: Version::HTTP_11,
                    remote_addr: Some(self.addr),
                }),
                Step::Refuse => Err(vigil_client::Error::connect_failure(
                    self.addr,
                    io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
                )),
                Step::Protocol => Err(vigil_client::Error::tls_failure(
                    self.addr,
                    io::Error::other("handshake failure"),
                )),
                Step::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("hang step outlived the attempt timeout")
                }
            }
        }
        .boxed()
    }
}

#[derive(Default)]
struct ScriptedFactory {
    scripts: Mutex<HashMap<IpAddr, VecDeque<Step>>>,
    attempts: Arc<Mutex<Vec<IpAddr>>>,
    created: Mutex<Vec<IpAddr>>,
}

impl ScriptedFactory {
    fn script(self, addr: IpAddr, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(addr, steps.into_iter().collect());
        self
    }

    fn attempt_log(&self) -> Vec<IpAddr> {
        self.attempts.lock().unwrap().clone()
    }
}

impl TransportFactory for ScriptedFactory {
    fn transport(&self, target: &TransportTarget) -> Result<Arc<dyn AddressTransport>> {
        self.created.lock().unwrap().push(target.addr.ip());
        let steps = self
            .scripts
            .lock()
            .unwrap()
            .remove(&target.addr.ip())
            .unwrap_or_default();
        Ok(Arc::new(ScriptedTransport {
            addr: target.addr,
            steps: Mutex::new(steps),
            attempts: Arc::clone(&self.attempts),
        }))
    }
}

fn client_with(
    addrs: Vec<IpAddr>,
    factory: ScriptedFactory,
) -> (FailoverClient, Arc<ScriptedFactory>, Arc<Resolver>) {
    let resolver = Arc::new(Resolver::with_lookup(Arc::new(StaticLookup(addrs))));
    let factory = Arc::new(factory);
    let config = ClientConfig::new(Scheme::Http, "pve.lan", 8006);
    let client = FailoverClient::with_parts(config, Arc::clone(&resolver), factory.clone());
    (client, factory, resolver)
}

#[tokio::test]
async fn refused_address_is_quarantined_and_skipped() {
    let factory = ScriptedFactory::default().script(v4(1), vec![Step::Refuse]);
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2)], factory);

    // First call: refused on .1, succeeds on .2.
    let resp = client.get("/api2/json/version", RequestOptions::new()).await.unwrap();
    assert!(resp.is_success());
    assert_eq!(factory.attempt_log(), vec![v4(1), v4(2)]);
    assert!(resolver.health().is_failed(v4(1)));
    assert_eq!(client.last_good(), Some(v4(2)));

    // Second call within the quarantine window: .1 is never attempted.
    client.get("/api2/json/version", RequestOptions::new()).await.unwrap();
    assert_eq!(factory.attempt_log(), vec![v4(1), v4(2), v4(2)]);
}

#[tokio::test]
async fn all_candidates_failing_is_terminal() {
    let factory = ScriptedFactory::default()
        .script(v4(1), vec![Step::Refuse])
        .script(v4(2), vec![Step::Refuse]);
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2)], factory);

    let err = client.get("/", RequestOptions::new()).await.unwrap_err();
    assert!(err.is_all_addresses_failed());
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(factory.attempt_log(), vec![v4(1), v4(2)]);
    // Every attempted address carries a failure record.
    assert!(resolver.health().is_failed(v4(1)));
    assert!(resolver.health().is_failed(v4(2)));
}

#[tokio::test]
async fn last_good_address_is_tried_first() {
    // A protocol error on .1 advances without quarantining it, so the second
    // call's ordering shows pure last-good stickiness.
    let factory = ScriptedFactory::default().script(v4(1), vec![Step::Protocol]);
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2), v4(3)], factory);

    client.get("/", RequestOptions::new()).await.unwrap();
    assert_eq!(client.last_good(), Some(v4(2)));
    assert!(!resolver.health().is_failed(v4(1)));

    client.get("/", RequestOptions::new()).await.unwrap();
    assert_eq!(factory.attempt_log(), vec![v4(1), v4(2), v4(2)]);
}

#[tokio::test]
async fn error_status_returns_immediately_and_sets_last_good() {
    let factory =
        ScriptedFactory::default().script(v4(1), vec![Step::Respond(StatusCode::INTERNAL_SERVER_ERROR)]);
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2)], factory);

    let resp = client.get("/", RequestOptions::new()).await.unwrap();
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    // Only a connection-level failure advances; a 500 is a live address.
    assert_eq!(factory.attempt_log(), vec![v4(1)]);
    assert_eq!(client.last_good(), Some(v4(1)));
    assert!(!resolver.health().is_failed(v4(1)));
}

#[tokio::test]
async fn fully_quarantined_list_still_attempts() {
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2)], ScriptedFactory::default());
    resolver.health().mark_failed(v4(1));
    resolver.health().mark_failed(v4(2));

    let resp = client.get("/", RequestOptions::new()).await.unwrap();
    assert!(resp.is_success());
    assert!(!factory.attempt_log().is_empty());
}

#[tokio::test]
async fn hung_attempt_times_out_and_fails_over() {
    let factory = ScriptedFactory::default().script(v4(1), vec![Step::Hang]);
    let (client, factory, resolver) = client_with(vec![v4(1), v4(2)], factory);

    let opts = RequestOptions::new().timeout(Duration::from_millis(50));
    let resp = client.get("/", opts).await.unwrap();
    assert!(resp.is_success());
    assert_eq!(factory.attempt_log(), vec![v4(1), v4(2)]);
    assert!(resolver.health().is_failed(v4(1)));
}

#[tokio::test]
async fn quarantine_expires_and_address_resumes() {
    let resolver = Arc::new(Resolver::with_windows(
        Arc::new(StaticLookup(vec![v4(1), v4(2)])),
        Duration::from_secs(60),
        Duration::from_millis(50),
    ));
    let factory = Arc::new(ScriptedFactory::default().script(v4(1), vec![Step::Refuse]));
    let config = ClientConfig::new(Scheme::Http, "pve.lan", 8006);
    let client = FailoverClient::with_parts(config, Arc::clone(&resolver), factory.clone());

    client.get("/", RequestOptions::new()).await.unwrap();
    assert!(resolver.health().is_failed(v4(1)));

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(!resolver.health().is_failed(v4(1)));
}

#[tokio::test]
async fn one_transport_per_address() {
    let (client, factory, _resolver) = client_with(vec![v4(1)], ScriptedFactory::default());

    client.get("/", RequestOptions::new()).await.unwrap();
    client.get("/", RequestOptions::new()).await.unwrap();

    assert_eq!(factory.created.lock().unwrap().as_slice(), &[v4(1)]);
}

#[tokio::test]
async fn resolution_failure_propagates() {
    let (client, _factory, _resolver) = client_with(Vec::new(), ScriptedFactory::default());

    let err = client.get("/", RequestOptions::new()).await.unwrap_err();
    assert!(err.is_resolution());
}

struct CountingAuth {
    calls: AtomicUsize,
}

impl AuthHook for CountingAuth {
    fn apply<'a>(&'a self, parts: &'a mut Parts) -> BoxFuture<'a, Result<()>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parts
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer fresh-token"));
        async { Ok(()) }.boxed()
    }
}

#[tokio::test]
async fn auth_hook_runs_once_per_attempt() {
    let factory = ScriptedFactory::default().script(v4(1), vec![Step::Refuse]);
    let resolver = Arc::new(Resolver::with_lookup(Arc::new(StaticLookup(vec![
        v4(1),
        v4(2),
    ]))));
    let auth = Arc::new(CountingAuth {
        calls: AtomicUsize::new(0),
    });
    let config = ClientConfig::new(Scheme::Http, "pve.lan", 8006);
    let client = FailoverClient::with_parts(config, resolver, Arc::new(factory))
        .auth_hook(auth.clone());

    client.get("/", RequestOptions::new()).await.unwrap();
    // One application for the refused attempt, one for the successful one.
    assert_eq!(auth.calls.load(Ordering::SeqCst), 2);
}
