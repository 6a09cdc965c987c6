//! `reqwest`-backed transport

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;

use super::{Method, RequestInit, Transport, TransportError, TransportResponse};
use crate::config::ServerSettings;
use crate::error::{ConnectorError, ConnectorResult};

/// HTTP transport over a shared `reqwest::Client`.
///
/// Cheap to clone; the client pools connections internally. Default headers and the
/// request timeout come from [`ServerSettings`] and are fixed after construction.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap an existing client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from server settings
    pub fn from_settings(settings: &ServerSettings) -> ConnectorResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConnectorError::Config(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ConnectorError::Config(format!("Invalid value for header {name}: {e}"))
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| ConnectorError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::request(url, err)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        init: RequestInit,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.request(to_reqwest(init.method), url);
        for (name, value) in &init.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = init.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        debug!(%url, method = %init.method, status, "HTTP exchange complete");

        Ok(TransportResponse { status, body })
    }
}
