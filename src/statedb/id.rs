//! `namespace:identifier` keys

use std::fmt;
use std::str::FromStr;

use crate::error::{ConnectorError, ConnectorResult};

/// Separator between namespace and identifier
pub const SEPARATOR: char = ':';

/// Namespace of a raw identifier: everything before the first separator
pub fn namespace_of(id: &str) -> Option<&str> {
    id.split_once(SEPARATOR).map(|(namespace, _)| namespace)
}

/// A validated `namespace:identifier` key.
///
/// The namespace is the non-empty prefix before the first `:`; the identifier is
/// everything after it and may itself contain `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId {
    raw: String,
    split: usize,
}

impl StateId {
    pub fn parse(id: impl Into<String>) -> ConnectorResult<Self> {
        let raw = id.into();
        let split = match raw.find(SEPARATOR) {
            Some(0) => {
                return Err(ConnectorError::InvalidIdentifier {
                    id: raw,
                    reason: "namespace is empty".to_string(),
                })
            }
            Some(split) => split,
            None => {
                return Err(ConnectorError::InvalidIdentifier {
                    id: raw,
                    reason: format!("missing '{SEPARATOR}' separator"),
                })
            }
        };
        Ok(Self { raw, split })
    }

    /// Build from its two parts
    pub fn new(namespace: &str, identifier: &str) -> ConnectorResult<Self> {
        if namespace.contains(SEPARATOR) {
            return Err(ConnectorError::InvalidIdentifier {
                id: format!("{namespace}{SEPARATOR}{identifier}"),
                reason: format!("namespace contains '{SEPARATOR}'"),
            });
        }
        Self::parse(format!("{namespace}{SEPARATOR}{identifier}"))
    }

    pub fn namespace(&self) -> &str {
        &self.raw[..self.split]
    }

    pub fn identifier(&self) -> &str {
        &self.raw[self.split + SEPARATOR.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for StateId {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for StateId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl From<StateId> for String {
    fn from(id: StateId) -> Self {
        id.raw
    }
}
