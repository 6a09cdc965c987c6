//! Namespaced state store
//!
//! Entries are addressed by `namespace:identifier` keys. Besides single-entry `fetch`,
//! `save` and `remove`, a [`StateDb`] can retrieve every entry of a namespace at once.
//!
//! Single-entry operations surface failures to the caller. Namespace reads never fail:
//! entries that cannot be retrieved are reported to the diagnostic sink and left out, so
//! callers always get whatever data is available.

mod id;

pub use id::{namespace_of, StateId, SEPARATOR};

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::connector::DataConnector;
use crate::diagnostics::{default_sink, Diagnostic, Diagnostics};
use crate::error::ConnectorResult;

/// Namespaced key-value state store
#[async_trait]
pub trait StateDb: Send + Sync {
    /// Retrieve one entry.
    ///
    /// Absence is not an error: a never-saved identifier yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails if the backing resource errors.
    async fn fetch(&self, id: &str) -> ConnectorResult<Option<Value>>;

    /// Retrieve every entry whose namespace is `namespace`, in no guaranteed order.
    ///
    /// Never fails; entries that could not be retrieved are omitted.
    async fn fetch_namespace(&self, namespace: &str) -> Vec<Value>;

    /// Store `value` under `id`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidIdentifier` if `id` is not `namespace:identifier`,
    /// or the backing resource's error if it rejects the write.
    async fn save(&self, id: &str, value: Value) -> ConnectorResult<()>;

    /// Delete the entry under `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::MethodNotImplemented` if the backing connector cannot
    /// remove entries.
    async fn remove(&self, id: &str) -> ConnectorResult<()>;
}

/// [`StateDb`] layered over any connector of JSON values keyed by string.
///
/// Namespace members are enumerated through [`DataConnector::keys`] and then fetched
/// individually and concurrently.
pub struct ConnectorStateDb<C: ?Sized> {
    connector: Arc<C>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<C: ?Sized> Clone for ConnectorStateDb<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<C> fmt::Debug for ConnectorStateDb<C>
where
    C: DataConnector<Value, String> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorStateDb")
            .field("connector", &self.connector.name())
            .finish_non_exhaustive()
    }
}

impl<C> ConnectorStateDb<C>
where
    C: DataConnector<Value, String> + ?Sized,
{
    pub fn new(connector: Arc<C>) -> Self {
        Self {
            connector,
            diagnostics: default_sink(),
        }
    }

    /// Route discarded entries to `diagnostics` instead of `tracing`
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn connector(&self) -> &Arc<C> {
        &self.connector
    }

    /// Like [`StateDb::fetch_namespace`], keeping each value's identifier
    pub async fn fetch_namespace_entries(&self, namespace: &str) -> Vec<(StateId, Value)> {
        let ids = match self.connector.keys().await {
            Ok(ids) => ids,
            Err(error) => {
                self.diagnostics.record(Diagnostic::EnumerationFailed {
                    namespace: namespace.to_string(),
                    error: error.to_string(),
                });
                return Vec::new();
            }
        };

        let members: Vec<StateId> = ids
            .into_iter()
            .filter(|id| namespace_of(id) == Some(namespace))
            .filter_map(|id| StateId::parse(id).ok())
            .collect();

        debug!(%namespace, count = members.len(), "Fetching namespace members");

        let fetches = members.into_iter().map(|id| async move {
            let result = self.connector.fetch(id.as_str().to_string()).await;
            (id, result)
        });

        let mut entries = Vec::new();
        for (id, result) in join_all(fetches).await {
            match result {
                Ok(value) => entries.push((id, value)),
                // Removed between enumeration and retrieval
                Err(error) if error.is_not_found() => {
                    debug!(%id, "Entry vanished during namespace scan");
                }
                Err(error) => self.diagnostics.record(Diagnostic::EntryDiscarded {
                    id: id.into_string(),
                    error: error.to_string(),
                }),
            }
        }
        entries
    }
}

#[async_trait]
impl<C> StateDb for ConnectorStateDb<C>
where
    C: DataConnector<Value, String> + ?Sized + 'static,
{
    async fn fetch(&self, id: &str) -> ConnectorResult<Option<Value>> {
        match self.connector.fetch(id.to_string()).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn fetch_namespace(&self, namespace: &str) -> Vec<Value> {
        self.fetch_namespace_entries(namespace)
            .await
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    async fn save(&self, id: &str, value: Value) -> ConnectorResult<()> {
        let id = StateId::parse(id)?;
        self.connector.save(id.into_string(), value).await
    }

    async fn remove(&self, id: &str) -> ConnectorResult<()> {
        self.connector.remove(id.to_string()).await
    }
}
