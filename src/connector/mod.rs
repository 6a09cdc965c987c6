//! Data connector capability contract
//!
//! A [`DataConnector`] is a stateless adapter exposing `fetch`, `list`, `save` and
//! `remove` over some backing resource. Only `fetch` is mandatory. Every other capability
//! has a default body that fails with [`ConnectorError::MethodNotImplemented`], so a single
//! contract serves read-only, write-only and full connectors alike: callers attempt the
//! operation and handle the "not implemented" error when the capability is absent.
//!
//! # Connectors
//!
//! - [`TranslatorConnector`]: read-only language packs from a remote catalog
//! - [`RemoteStateConnector`]: read/write JSON entries on a remote state endpoint
//! - [`MemoryConnector`]: in-process backing resource, every capability
//!
//! # Example
//!
//! ```no_run
//! use statelink::connector::{DataConnector, MemoryConnector};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = MemoryConnector::new();
//!     connector.save("editor:theme".to_string(), json!("dark")).await?;
//!     let theme = connector.fetch("editor:theme".to_string()).await?;
//!     assert_eq!(theme, json!("dark"));
//!     Ok(())
//! }
//! ```

mod memory;
mod registry;
mod remote_state;
mod translator;

pub use memory::MemoryConnector;
pub use registry::{ConnectorFactory, ConnectorRegistry, SharedConnector};
pub use remote_state::{RemoteStateConnector, STATE_NAMESPACE};
pub use translator::{
    Language, LanguageQuery, TranslationBundle, TranslatorConnector, TRANSLATIONS_NAMESPACE,
};

use async_trait::async_trait;

use crate::error::{ConnectorError, ConnectorResult};

/// Every identifier together with its value, index-aligned
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<I, V> {
    pub ids: Vec<I>,
    pub values: Vec<V>,
}

impl<I, V> Listing<I, V> {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over `(id, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&I, &V)> {
        self.ids.iter().zip(self.values.iter())
    }
}

impl<I, V> Default for Listing<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, V> FromIterator<(I, V)> for Listing<I, V> {
    fn from_iter<T: IntoIterator<Item = (I, V)>>(iter: T) -> Self {
        let (ids, values) = iter.into_iter().unzip();
        Self { ids, values }
    }
}

/// Uniform asynchronous access to a backing resource.
///
/// Generic over the value type `V`, the query type `Q` used by `fetch`, and the identifier
/// type `I` used by `save`/`remove`.
///
/// Implementors must be `Send + Sync`; a connector holds no entry data and is reused across
/// concurrent calls.
///
/// # Example Implementation
///
/// ```ignore
/// use statelink::connector::DataConnector;
/// use statelink::ConnectorResult;
/// use async_trait::async_trait;
///
/// struct Clock;
///
/// #[async_trait]
/// impl DataConnector<u64, ()> for Clock {
///     async fn fetch(&self, _query: ()) -> ConnectorResult<u64> {
///         Ok(42)
///     }
///     // list/save/remove fail with MethodNotImplemented
/// }
/// ```
#[async_trait]
pub trait DataConnector<V, Q, I = String>: Send + Sync
where
    V: Send + 'static,
    Q: Send + 'static,
    I: Send + 'static,
{
    /// Retrieve the value addressed by `query`
    async fn fetch(&self, query: Q) -> ConnectorResult<V>;

    /// Retrieve every identifier and value
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::MethodNotImplemented` unless overridden.
    async fn list(&self) -> ConnectorResult<Listing<I, V>> {
        Err(ConnectorError::not_implemented(self.name(), "list"))
    }

    /// Store `value` under `id`, overwriting any existing value
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::MethodNotImplemented` unless overridden.
    async fn save(&self, _id: I, _value: V) -> ConnectorResult<()> {
        Err(ConnectorError::not_implemented(self.name(), "save"))
    }

    /// Delete the value stored under `id`
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::MethodNotImplemented` unless overridden.
    async fn remove(&self, _id: I) -> ConnectorResult<()> {
        Err(ConnectorError::not_implemented(self.name(), "remove"))
    }

    /// Enumerate identifiers without their values.
    ///
    /// Derived from [`list`](DataConnector::list) by default; connectors with a cheaper
    /// index should override it.
    async fn keys(&self) -> ConnectorResult<Vec<I>> {
        Ok(self.list().await?.ids)
    }

    /// Label used in error messages
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
