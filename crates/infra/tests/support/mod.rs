//! Shared helpers for infra integration tests.
//!
//! The SDK is blocking, so tests are plain `#[test]` functions. A private
//! tokio runtime drives the wiremock server setup and inspection; the SDK
//! calls run on the test thread.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tourist_esim_common::time::MockClock;
use tourist_esim_core::TokenStore;
use tourist_esim_domain::{ClientConfig, ClientConfigBuilder};
use tourist_esim_infra::{EsimClient, MemoryTokenStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const REVOKE_PATH: &str = "/oauth/revoke";

/// Mock partner API plus the runtime that serves it.
pub struct MockApi {
    pub server: MockServer,
    rt: Runtime,
}

impl MockApi {
    pub fn start() -> Self {
        init_tracing();
        let rt = Runtime::new().expect("tokio runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Token endpoint answering with `{"access_token": token, "expires_in": lifetime}`.
    pub fn grant_token(&self, token: &str, lifetime: u64) {
        self.mount(
            Mock::given(method("POST"))
                .and(path(TOKEN_PATH))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"access_token": token, "expires_in": lifetime})),
                ),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt.block_on(self.server.received_requests()).unwrap_or_default()
    }

    pub fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.requests().into_iter().filter(|r| r.url.path() == request_path).collect()
    }

    pub fn body_of(request: &Request) -> Value {
        serde_json::from_slice(&request.body).expect("request body is JSON")
    }

    /// Settings pointing both the resource and OAuth endpoints at this server.
    pub fn config(&self) -> ClientConfigBuilder {
        ClientConfig::builder("client-id", "client-secret")
            .base_url(format!("{}/v1", self.uri()))
            .auth_base_url(self.uri())
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .use_system_proxy(false)
    }

    /// Client with an in-memory store and a mock clock (no real sleeping).
    pub fn client(&self) -> (EsimClient, MockClock) {
        self.client_with(self.config().build().expect("valid config"))
    }

    pub fn client_with(&self, config: ClientConfig) -> (EsimClient, MockClock) {
        let clock = MockClock::new();
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let client = EsimClient::with_parts(config, store, Arc::new(clock.clone()))
            .expect("client should build");
        (client, clock)
    }
}

/// Route SDK logs to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Base URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
