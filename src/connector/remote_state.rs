//! Read/write connector for a remote state endpoint
//!
//! Wire protocol, relative to the configured namespace:
//!
//! | operation | request          | success body                         |
//! |-----------|------------------|--------------------------------------|
//! | fetch     | `GET <id>`       | stored JSON value                    |
//! | save      | `PUT <id>`       | ignored                              |
//! | remove    | `DELETE <id>`    | ignored                              |
//! | list      | `GET` (root)     | `{"ids": [...], "values": [...]}`    |
//!
//! A 404 on `fetch` or `remove` means the entry does not exist.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{DataConnector, Listing};
use crate::error::{ConnectorError, ConnectorResult};
use crate::remote::RemoteRequest;
use crate::transport::{Method, RequestInit, Transport};

#[cfg(feature = "http")]
use crate::config::ConnectorConfig;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Default namespace segment of the state API
pub const STATE_NAMESPACE: &str = "api/state";

const NOT_FOUND: u16 = 404;

#[derive(Debug, Deserialize)]
struct ListingBody {
    ids: Vec<String>,
    values: Vec<Value>,
}

/// Connector over a remote JSON state endpoint
#[derive(Debug, Clone)]
pub struct RemoteStateConnector {
    request: RemoteRequest,
}

impl RemoteStateConnector {
    pub fn new(request: RemoteRequest) -> Self {
        Self { request }
    }

    /// Connector against `base_url` using the default state namespace
    pub fn with_transport(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self::new(RemoteRequest::new(transport, base_url, STATE_NAMESPACE))
    }

    /// HTTP connector for the server and state namespace in `config`
    #[cfg(feature = "http")]
    pub fn from_config(config: &ConnectorConfig) -> ConnectorResult<Self> {
        config.server.validate()?;
        let transport = Arc::new(HttpTransport::from_settings(&config.server)?);
        Ok(Self::new(RemoteRequest::new(
            transport,
            config.server.base_url.clone(),
            config.state_namespace.clone(),
        )))
    }

    fn not_found(id: String, err: ConnectorError) -> ConnectorError {
        match err.status() {
            Some(NOT_FOUND) => ConnectorError::NotFound { id },
            _ => err,
        }
    }
}

#[async_trait]
impl DataConnector<Value, String> for RemoteStateConnector {
    async fn fetch(&self, id: String) -> ConnectorResult<Value> {
        let result = self.request.request(&id, RequestInit::get()).await;
        result.map_err(|e| Self::not_found(id, e))
    }

    async fn list(&self) -> ConnectorResult<Listing<String, Value>> {
        let body: ListingBody = self.request.request_as("", RequestInit::get()).await?;
        if body.ids.len() != body.values.len() {
            return Err(ConnectorError::Serialization(format!(
                "listing has {} ids but {} values",
                body.ids.len(),
                body.values.len()
            )));
        }
        Ok(Listing {
            ids: body.ids,
            values: body.values,
        })
    }

    async fn save(&self, id: String, value: Value) -> ConnectorResult<()> {
        let init = RequestInit::with_method(Method::Put).json(&value);
        self.request.request(&id, init).await?;
        Ok(())
    }

    async fn remove(&self, id: String) -> ConnectorResult<()> {
        let result = self
            .request
            .request(&id, RequestInit::with_method(Method::Delete))
            .await;
        result.map_err(|e| Self::not_found(id, e))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "remote-state"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::tests::ScriptedTransport;
    use serde_json::json;

    fn connector(transport: ScriptedTransport) -> (RemoteStateConnector, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let connector = RemoteStateConnector::with_transport(transport.clone(), "http://h");
        (connector, transport)
    }

    #[tokio::test]
    async fn test_fetch_maps_404_to_not_found() {
        let (connector, _) = connector(
            ScriptedTransport::default()
                .reply(404, "")
                .reply(500, r#"{"message":"db down"}"#),
        );

        let err = connector.fetch("a:1".to_string()).await.unwrap_err();
        assert!(matches!(err, ConnectorError::NotFound { ref id } if id == "a:1"));

        let err = connector.fetch("a:1".to_string()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_save_puts_json_body() {
        let (connector, transport) = connector(ScriptedTransport::default().reply(204, ""));

        connector
            .save("a:1".to_string(), json!({"open": true}))
            .await
            .unwrap();

        let (url, init) = transport.requests().remove(0);
        assert_eq!(url, "http://h/api/state/a:1");
        assert_eq!(init.method, Method::Put);
        assert_eq!(init.body.as_deref(), Some(r#"{"open":true}"#));
        assert!(init
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    }

    #[tokio::test]
    async fn test_identifier_is_one_path_segment() {
        let (connector, transport) = connector(
            ScriptedTransport::default()
                .reply(204, "")
                .reply(204, "")
                .reply(200, "1"),
        );

        connector.save("a:x?1".to_string(), json!(1)).await.unwrap();
        connector.save("a:dir/file#2".to_string(), json!(2)).await.unwrap();
        connector.fetch("a:x?1".to_string()).await.unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            vec![
                "http://h/api/state/a:x%3F1",
                "http://h/api/state/a:dir%2Ffile%232",
                "http://h/api/state/a:x%3F1",
            ]
        );
    }

    #[tokio::test]
    async fn test_save_surfaces_rejection() {
        let (connector, _) = connector(ScriptedTransport::default().reply(403, "read only"));
        let err = connector.save("a:1".to_string(), json!(1)).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Response { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_remove_issues_delete() {
        let (connector, transport) =
            connector(ScriptedTransport::default().reply(204, "").reply(404, ""));

        connector.remove("a:1".to_string()).await.unwrap();
        assert_eq!(transport.requests()[0].1.method, Method::Delete);

        let err = connector.remove("a:1".to_string()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_and_keys() {
        let (connector, transport) = connector(
            ScriptedTransport::default()
                .reply(200, r#"{"ids":["a:1","b:1"],"values":[1,2]}"#)
                .reply(200, r#"{"ids":["a:1"],"values":[]}"#),
        );

        assert_eq!(connector.keys().await.unwrap(), vec!["a:1", "b:1"]);
        assert_eq!(transport.requests()[0].0, "http://h/api/state");

        let err = connector.list().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (connector, _) = connector(
            ScriptedTransport::default()
                .fail("connection refused")
                .fail("connection refused"),
        );

        assert!(connector.fetch("a:1".to_string()).await.unwrap_err().is_network());
        assert!(connector
            .save("a:1".to_string(), json!(1))
            .await
            .unwrap_err()
            .is_network());
    }
}
