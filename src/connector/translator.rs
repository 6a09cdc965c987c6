//! Read-only translation catalog connector

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::DataConnector;
use crate::error::ConnectorResult;
use crate::remote::RemoteRequest;
use crate::transport::{RequestInit, Transport};

#[cfg(feature = "http")]
use crate::config::ConnectorConfig;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Namespace segment of the translations API
pub const TRANSLATIONS_NAMESPACE: &str = "lab/api/translations/";

/// Message keys mapped to translated strings
pub type Language = BTreeMap<String, String>;

/// Selects a language pack by locale code; an empty locale addresses the catalog root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageQuery {
    pub language: String,
}

impl LanguageQuery {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

/// Envelope the translations server wraps every answer in
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranslationBundle<T> {
    pub data: T,
    #[serde(default)]
    pub message: String,
}

/// Fetches language packs from the remote translation catalog.
///
/// Read-only: `save`, `remove` and `list` fail with `MethodNotImplemented`.
#[derive(Debug, Clone)]
pub struct TranslatorConnector {
    request: RemoteRequest,
}

impl TranslatorConnector {
    pub fn new(request: RemoteRequest) -> Self {
        Self { request }
    }

    /// Connector against `base_url` using the standard translations namespace
    pub fn with_transport(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self::new(RemoteRequest::new(
            transport,
            base_url,
            TRANSLATIONS_NAMESPACE,
        ))
    }

    /// HTTP connector for the server and translations namespace in `config`
    #[cfg(feature = "http")]
    pub fn from_config(config: &ConnectorConfig) -> ConnectorResult<Self> {
        config.server.validate()?;
        let transport = Arc::new(HttpTransport::from_settings(&config.server)?);
        Ok(Self::new(RemoteRequest::new(
            transport,
            config.server.base_url.clone(),
            config.translations_namespace.clone(),
        )))
    }

    /// Fetch one language pack and narrow its `data` member to message strings
    pub async fn fetch_language(&self, locale: &str) -> ConnectorResult<Language> {
        let bundle: TranslationBundle<Language> =
            self.request.request_as(locale, RequestInit::get()).await?;
        Ok(bundle.data)
    }

    /// Language packs installed on the server, as reported at the catalog root
    pub async fn installed_languages(&self) -> ConnectorResult<TranslationBundle<Value>> {
        self.request.request_as("", RequestInit::get()).await
    }
}

#[async_trait]
impl DataConnector<Value, LanguageQuery> for TranslatorConnector {
    async fn fetch(&self, query: LanguageQuery) -> ConnectorResult<Value> {
        self.request.request(&query.language, RequestInit::get()).await
    }

    fn name(&self) -> &str {
        "translator"
    }
}
