/*!
 * statelink - pluggable asynchronous data connectors
 *
 * A uniform contract for fetching, saving and enumerating JSON values under
 * namespaced identifiers:
 * - `DataConnector` capability contract with explicit "not implemented" defaults
 * - Namespaced state store with fault-tolerant bulk reads
 * - Remote request adapter separating network failures from error responses
 * - Connectors for a remote translation catalog, a remote state endpoint and memory
 */

pub mod config;
pub mod connector;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod remote;
pub mod statedb;
pub mod transport;

// Re-export commonly used types
pub use config::{ConnectorConfig, LogLevel, LoggingConfig, ServerSettings};
pub use connector::{
    ConnectorRegistry, DataConnector, LanguageQuery, Listing, MemoryConnector,
    RemoteStateConnector, TranslatorConnector,
};
pub use diagnostics::{CollectingDiagnostics, Diagnostic, Diagnostics, TracingDiagnostics};
pub use error::{ConnectorError, ConnectorResult};
pub use remote::RemoteRequest;
pub use statedb::{ConnectorStateDb, StateDb, StateId};
pub use transport::{Method, RequestInit, Transport, TransportError, TransportResponse};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
