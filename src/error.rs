/*!
 * Error types for statelink
 */

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for connector operations
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

/// Unified error type for connector and state store operations
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The transport call itself could not complete (DNS, connection, abort)
    #[error("Network error while requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The server answered with a non-success status
    #[error("Response error ({status}): {message}")]
    Response {
        status: u16,
        /// Raw response body text
        body: String,
        /// `message` field of a JSON error body, otherwise the raw body
        message: String,
    },

    /// The connector does not provide this capability
    #[error("Operation '{operation}' not implemented by connector {connector}")]
    MethodNotImplemented {
        connector: String,
        operation: &'static str,
    },

    /// The backing resource holds no entry under this identifier
    #[error("No entry stored under '{id}'")]
    NotFound { id: String },

    /// Identifier does not follow the `namespace:identifier` convention
    #[error("Invalid identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// A value could not be converted to or from its typed shape
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectorError {
    pub(crate) fn not_implemented(connector: impl Into<String>, operation: &'static str) -> Self {
        ConnectorError::MethodNotImplemented {
            connector: connector.into(),
            operation,
        }
    }

    /// Build a response error, preferring the `message` field of a JSON object body
    pub fn response(status: u16, body: impl Into<String>, data: &serde_json::Value) -> Self {
        let body = body.into();
        let message = data
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.clone());

        ConnectorError::Response {
            status,
            body,
            message,
        }
    }

    /// The service could not be reached
    pub fn is_network(&self) -> bool {
        matches!(self, ConnectorError::Network { .. })
    }

    /// The service was reached and answered with an error
    pub fn is_response(&self) -> bool {
        matches!(self, ConnectorError::Response { .. })
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, ConnectorError::MethodNotImplemented { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectorError::NotFound { .. })
    }

    /// HTTP status carried by a response error
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectorError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ConnectorError {
    fn from(err: toml::de::Error) -> Self {
        ConnectorError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_prefers_message_field() {
        let body = r#"{"message":"no such locale"}"#;
        let err = ConnectorError::response(404, body, &json!({"message": "no such locale"}));

        assert!(err.is_response());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Response error (404): no such locale");
    }

    #[test]
    fn test_response_falls_back_to_raw_body() {
        let err = ConnectorError::response(500, "boom", &json!("boom"));
        match err {
            ConnectorError::Response { message, body, .. } => {
                assert_eq!(message, "boom");
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // A non-string message field is not a display message
        let err = ConnectorError::response(400, r#"{"message":3}"#, &json!({"message": 3}));
        match err {
            ConnectorError::Response { message, .. } => assert_eq!(message, r#"{"message":3}"#),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_implemented_display() {
        let err = ConnectorError::not_implemented("translator", "save");
        assert!(err.is_not_implemented());
        assert!(!err.is_network());
        assert_eq!(
            err.to_string(),
            "Operation 'save' not implemented by connector translator"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: ConnectorError = parse_err.into();
        assert!(matches!(err, ConnectorError::Serialization(_)));
        assert_eq!(err.status(), None);
    }
}
