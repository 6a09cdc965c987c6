//! Diagnostic sink for tolerated faults
//!
//! Some faults are deliberately not surfaced to callers: a response body that is not JSON,
//! or an entry that could not be retrieved during a namespace scan. Those are reported to a
//! [`Diagnostics`] sink instead. [`TracingDiagnostics`] is the default and forwards to
//! `tracing`; [`CollectingDiagnostics`] keeps the events so tests can assert on them.

use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A tolerated fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Non-empty response body that did not parse as JSON; raw text was kept
    NonJsonBody { url: String, status: u16 },

    /// Namespace members could not be enumerated; the scan returned nothing
    EnumerationFailed { namespace: String, error: String },

    /// One entry of a namespace scan failed and was left out of the result
    EntryDiscarded { id: String, error: String },
}

/// Receiver for tolerated faults
pub trait Diagnostics: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::NonJsonBody { url, status } => {
                debug!(%url, status, "Not a JSON response body, keeping raw text");
            }
            Diagnostic::EnumerationFailed { namespace, error } => {
                warn!(%namespace, %error, "Failed to enumerate namespace");
            }
            Diagnostic::EntryDiscarded { id, error } => {
                warn!(%id, %error, "Discarding entry from namespace scan");
            }
        }
    }
}

/// Default sink shared by connectors that were not given one
pub fn default_sink() -> Arc<dyn Diagnostics> {
    Arc::new(TracingDiagnostics)
}

/// Records every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
