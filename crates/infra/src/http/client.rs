use std::time::Duration;

use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{IntoUrl, Method};
use tourist_esim_core::ResponseMeta;
use tourist_esim_domain::constants::REQUEST_ID_HEADER;
use tourist_esim_domain::{ClientConfig, EsimError};
use tracing::debug;

use crate::errors::InfraError;

/// Status, headers of interest and body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
    pub meta: ResponseMeta,
}

impl HttpReply {
    /// 2xx status
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking HTTP client with timeouts, TLS and default JSON headers.
///
/// Sends exactly one request per [`send`](Self::send) call; retry policy is
/// applied by the caller.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the SDK settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self, EsimError> {
        Self::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .accept_invalid_certs(!config.verify_ssl)
            .use_system_proxy(config.use_system_proxy)
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send one request and read the whole response.
    ///
    /// Transport failures are returned as the raw `reqwest` error so callers
    /// can decide whether they are worth retrying.
    pub fn send(&self, builder: RequestBuilder) -> Result<HttpReply, reqwest::Error> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request)?;
        let status = response.status().as_u16();
        let meta = response_meta(&response);
        let body = response.text()?;

        debug!(%method, %url, status, request_id = ?meta.request_id, "received HTTP response");
        Ok(HttpReply { status, body, meta })
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    accept_invalid_certs: bool,
    use_system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
            default_headers: None,
            accept_invalid_certs: false,
            use_system_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers added to every request, replacing the JSON defaults.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Skip certificate verification (self-signed sandbox hosts).
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Route requests through the proxy named by the environment (default on).
    pub fn use_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, EsimError> {
        let headers = self.default_headers.unwrap_or_else(json_headers);

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .default_headers(headers);

        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            EsimError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn response_meta(response: &Response) -> ResponseMeta {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    ResponseMeta {
        request_id: header(REQUEST_ID_HEADER),
        retry_after: header(RETRY_AFTER.as_str()).and_then(|value| value.parse().ok()),
    }
}

/// Transport failures worth another attempt: the connection was never made.
pub fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_connect()
}
