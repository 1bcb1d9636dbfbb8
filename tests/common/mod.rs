#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use plausible_relay::prelude::*;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::Layer;

/// One event received by the fake collector.
#[derive(Debug)]
pub struct CapturedEvent {
    pub body: String,
    pub headers: HeaderMap,
}

impl CapturedEvent {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct CollectorState {
    tx: mpsc::UnboundedSender<CapturedEvent>,
    status: StatusCode,
    delay: Duration,
}

async fn collect(State(st): State<CollectorState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if !st.delay.is_zero() {
        tokio::time::sleep(st.delay).await;
    }
    let _ = st.tx.send(CapturedEvent {
        body: String::from_utf8_lossy(&body).into_owned(),
        headers,
    });
    st.status
}

/// Local stand-in for the Plausible events API.
pub struct Collector {
    pub base_url: String,
    rx: mpsc::UnboundedReceiver<CapturedEvent>,
}

impl Collector {
    pub async fn start() -> Self {
        Self::start_with(StatusCode::ACCEPTED, Duration::ZERO).await
    }

    pub async fn start_with(status: StatusCode, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .route("/api/event", post(collect))
            .with_state(CollectorState { tx, status, delay });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/"),
            rx,
        }
    }

    /// Waits for the next event, panicking after two seconds.
    pub async fn next_event(&mut self) -> CapturedEvent {
        tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .expect("no event received within 2s")
            .expect("collector stopped")
    }

    /// Asserts nothing arrives for a short while.
    pub async fn assert_no_event(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(300), self.rx.recv()).await;
        assert!(result.is_err(), "unexpected event: {:?}", result);
    }
}

/// Address of a port nobody listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn relay_config(base_url: &str, policy: RelayPolicy) -> RelayConfig {
    RelayConfig::new("example.com")
        .with_base_url(base_url)
        .with_policy(policy)
}

pub fn relay(base_url: &str, policy: RelayPolicy) -> EventRelay {
    EventRelay::new(relay_config(base_url, policy)).unwrap()
}

pub fn handler(base_url: &str, policy: RelayPolicy) -> PageviewHandler {
    module::provision(relay_config(base_url, policy)).unwrap()
}

/// Inserts a fixed `ConnectInfo` so handlers see a peer address under
/// `axum_test::TestServer`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
