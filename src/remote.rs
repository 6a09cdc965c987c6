//! Remote request adapter
//!
//! [`RemoteRequest`] issues one request against `base_url / namespace / suffix`, the suffix
//! being encoded as a single path segment, and turns the outcome into either a JSON value or
//! a classified [`ConnectorError`]:
//!
//! - the transport failed: [`ConnectorError::Network`], wrapping the cause
//! - the server answered with a non-ok status: [`ConnectorError::Response`]
//! - otherwise: the parsed body, or the raw text when the body is not JSON
//!
//! A body that is not JSON is tolerated and only reported to the diagnostic sink.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::diagnostics::{default_sink, Diagnostic, Diagnostics};
use crate::error::{ConnectorError, ConnectorResult};
use crate::transport::{RequestInit, Transport};

/// Build `base / namespace / segment`.
///
/// The namespace is a path and contributes one segment per `/`-separated part. `segment`
/// is always a single path segment: `/`, `?`, `#` and `%` in it are percent-encoded, so
/// distinct identifiers address distinct resources. An empty segment addresses the
/// namespace root, which keeps the namespace's trailing `/` if it has one.
pub fn endpoint_url(base: &str, namespace: &str, segment: &str) -> ConnectorResult<String> {
    let mut url = Url::parse(base)
        .map_err(|e| ConnectorError::Config(format!("Invalid base URL '{base}': {e}")))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ConnectorError::Config(format!("Base URL '{base}' cannot have a path")))?;
        path.pop_if_empty();
        path.extend(namespace.split('/').filter(|part| !part.is_empty()));

        if !segment.is_empty() {
            path.push(segment);
        } else if namespace.ends_with('/') {
            path.push("");
        }
    }

    Ok(url.into())
}

/// Request adapter bound to one namespace of a remote service
#[derive(Clone)]
pub struct RemoteRequest {
    transport: Arc<dyn Transport>,
    base_url: String,
    namespace: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl fmt::Debug for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRequest")
            .field("base_url", &self.base_url)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RemoteRequest {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            namespace: namespace.into(),
            diagnostics: default_sink(),
        }
    }

    /// Route tolerated faults to `diagnostics` instead of `tracing`
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Target URL for `suffix`
    pub fn url(&self, suffix: &str) -> ConnectorResult<String> {
        endpoint_url(&self.base_url, &self.namespace, suffix)
    }

    /// Perform the request and return the parsed (or raw) body
    pub async fn request(&self, suffix: &str, init: RequestInit) -> ConnectorResult<Value> {
        let url = self.url(suffix)?;
        debug!(%url, method = %init.method, "Issuing remote request");

        let response = self
            .transport
            .send(&url, init)
            .await
            .map_err(|source| ConnectorError::Network {
                url: url.clone(),
                source,
            })?;

        let data = if response.body.is_empty() {
            Value::String(String::new())
        } else {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(parsed) => parsed,
                Err(_) => {
                    self.diagnostics.record(Diagnostic::NonJsonBody {
                        url: url.clone(),
                        status: response.status,
                    });
                    Value::String(response.body.clone())
                }
            }
        };

        if !response.ok() {
            return Err(ConnectorError::response(
                response.status,
                response.body,
                &data,
            ));
        }

        Ok(data)
    }

    /// Perform the request and narrow the result to `T`
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        suffix: &str,
        init: RequestInit,
    ) -> ConnectorResult<T> {
        let data = self.request(suffix, init).await?;
        Ok(serde_json::from_value(data)?)
    }
}
