//! Transport abstraction
//!
//! A [`Transport`] performs exactly one HTTP-style request/response exchange. It knows
//! nothing about JSON, error bodies or connectors: it either hands back the status and the
//! full body text, or fails with a [`TransportError`] when the exchange could not complete.
//!
//! The HTTP implementation lives in [`HttpTransport`] (feature `http`, on by default).
//! Timeouts and default headers belong to the transport, not to the connectors built on it.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request options passed through to the transport unexamined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInit {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestInit {
    /// Plain GET with no headers and no body
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and the matching content type
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.header("Content-Type", "application/json")
            .body(value.to_string())
    }
}

/// Completed exchange: status plus the full body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange could not complete
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS failure, body read failure...
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The transport's configured timeout elapsed
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The request was aborted before completion
    #[error("request to {url} aborted: {reason}")]
    Aborted { url: String, reason: String },
}

impl TransportError {
    pub fn request(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TransportError::Request {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// One request/response exchange against a fully composed URL.
///
/// Implementors must be `Send + Sync`; a transport is shared read-only by every connector
/// built on it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, init: RequestInit)
        -> Result<TransportResponse, TransportError>;
}
