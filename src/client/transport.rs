use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One Platform request, independent of the HTTP stack that sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Authorization` header (the raw service token).
    pub authorization: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// Convenience constructor for JSON bodies.
    pub fn json(status: u16, body: &Value) -> Self {
        Self { status, body: body.to_string().into_bytes() }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the Platform. Production uses [`ReqwestTransport`].
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Deliver one request. Only transport failures are errors; every HTTP status is a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError>;
}

/// `reqwest`-backed transport sharing one connection pool for the process.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client; `request_timeout` bounds each individual HTTP call.
    pub fn new(request_timeout: Option<Duration>) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("adaptive-provider/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|error| {
            ProviderError::Config(format!("failed to build HTTP client: {error}"))
        })?;
        Ok(Self { http_client })
    }

    /// Wrap an already configured client.
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        debug!(method = request.method.as_str(), url = %request.url, "platform request");
        let mut builder = match request.method {
            Method::Get => self.http_client.get(&request.url),
            Method::Post => self.http_client.post(&request.url),
        }
        .header(reqwest::header::AUTHORIZATION, request.authorization.as_str());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| ProviderError::Network(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| ProviderError::Network(error.to_string()))?;

        Ok(HttpResponse { status, body: body.to_vec() })
    }
}
