//! Connector registry and factory
//!
//! Maps a backend name to an async factory producing a state connector from a
//! [`ConnectorConfig`], so the backing resource of a state store can be chosen from
//! configuration. Built-ins are `"memory"` and, with the `http` feature, `"remote"`.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{DataConnector, MemoryConnector};
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, ConnectorResult};

#[cfg(feature = "http")]
use super::RemoteStateConnector;

/// Connector over JSON values addressed by string identifiers, shareable across tasks
pub type SharedConnector = Arc<dyn DataConnector<Value, String>>;

/// Box future for async factory functions
pub type BoxFuture<T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send>>;

/// Factory function type for creating connectors
pub type ConnectorFactory =
    Arc<dyn Fn(&ConnectorConfig) -> BoxFuture<ConnectorResult<SharedConnector>> + Send + Sync>;

/// Registry of named connector factories
///
/// # Example
///
/// ```no_run
/// use statelink::config::ConnectorConfig;
/// use statelink::connector::ConnectorRegistry;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = ConnectorRegistry::new();
///     let connector = registry.create("memory", &ConnectorConfig::default()).await?;
///     assert_eq!(connector.name(), "memory");
///     Ok(())
/// }
/// ```
pub struct ConnectorRegistry {
    factories: RwLock<HashMap<String, ConnectorFactory>>,
}

impl ConnectorRegistry {
    /// Create a registry holding the built-in factories
    pub fn new() -> Self {
        let registry = Self {
            factories: RwLock::new(HashMap::new()),
        };
        registry.register_builtin();
        registry
    }

    fn register_builtin(&self) {
        self.register(
            "memory",
            Arc::new(
                |_config: &ConnectorConfig| -> BoxFuture<ConnectorResult<SharedConnector>> {
                    Box::pin(async move { Ok(Arc::new(MemoryConnector::new()) as SharedConnector) })
                },
            ),
        );

        #[cfg(feature = "http")]
        self.register(
            "remote",
            Arc::new(|config: &ConnectorConfig| -> BoxFuture<ConnectorResult<SharedConnector>> {
                let config = config.clone();
                Box::pin(async move {
                    let connector = RemoteStateConnector::from_config(&config)?;
                    Ok(Arc::new(connector) as SharedConnector)
                })
            }),
        );
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register(&self, name: impl Into<String>, factory: ConnectorFactory) {
        self.factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.into(), factory);
    }

    /// Remove a factory; returns whether one was registered
    pub fn unregister(&self, name: &str) -> bool {
        self.factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
            .is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Build the connector registered under `name`
    pub async fn create(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> ConnectorResult<SharedConnector> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| ConnectorError::Config(format!("Unknown connector: {name}")))?;

        factory(config).await
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Listing;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed;

    #[async_trait]
    impl DataConnector<Value, String> for Fixed {
        async fn fetch(&self, _id: String) -> ConnectorResult<Value> {
            Ok(json!("fixed"))
        }

        async fn list(&self) -> ConnectorResult<Listing<String, Value>> {
            Ok(Listing::new())
        }
    }

    #[tokio::test]
    async fn test_builtin_memory() {
        let registry = ConnectorRegistry::new();
        assert!(registry.is_registered("memory"));

        let connector = registry
            .create("memory", &ConnectorConfig::default())
            .await
            .unwrap();
        connector.save("a:1".to_string(), json!(1)).await.unwrap();
        assert_eq!(connector.fetch("a:1".to_string()).await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_unknown_connector() {
        let registry = ConnectorRegistry::new();
        let err = registry
            .create("nope", &ConnectorConfig::default())
            .await
            .err()
            .expect("unknown name should fail");
        assert!(matches!(err, ConnectorError::Config(_)));
    }

    #[tokio::test]
    async fn test_register_custom() {
        let registry = ConnectorRegistry::new();
        registry.register(
            "fixed",
            Arc::new(
                |_: &ConnectorConfig| -> BoxFuture<ConnectorResult<SharedConnector>> {
                    Box::pin(async { Ok(Arc::new(Fixed) as SharedConnector) })
                },
            ),
        );
        assert!(registry.names().contains(&"fixed".to_string()));

        let connector = registry
            .create("fixed", &ConnectorConfig::default())
            .await
            .unwrap();
        assert_eq!(connector.fetch("x".to_string()).await.unwrap(), json!("fixed"));
        assert!(connector
            .save("x".to_string(), json!(1))
            .await
            .unwrap_err()
            .is_not_implemented());

        assert!(registry.unregister("fixed"));
        assert!(!registry.is_registered("fixed"));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_builtin_remote_validates_settings() {
        let registry = ConnectorRegistry::new();
        let mut config = ConnectorConfig::default();
        config.server.base_url = "not a url".to_string();

        let err = registry.create("remote", &config).await.err().unwrap();
        assert!(matches!(err, ConnectorError::Config(_)));

        let connector = registry
            .create("remote", &ConnectorConfig::default())
            .await
            .unwrap();
        assert_eq!(connector.name(), "remote-state");
    }
}
