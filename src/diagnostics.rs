//! Diagnostic stream for failed guest-runtime operations
//!
//! Failures are never raised into the host's own error system. Each one is
//! logged and kept in a bounded in-memory stream so the editor can show or
//! drain it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::BridgeError;

/// One failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub operation: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Arc<Mutex<VecDeque<Diagnostic>>>,
    capacity: usize,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, operation: &str, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::error!(operation, %detail, "guest operation failed");

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Diagnostic {
            operation: operation.to_string(),
            detail,
        });
    }

    pub fn record_error(&self, err: &BridgeError) {
        self.record(err.operation(), err.to_string());
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.entries.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_error_uses_operation_label() {
        let diagnostics = Diagnostics::new(8);
        diagnostics.record_error(&BridgeError::Compile("unexpected end".into()));
        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, "compiling");
        assert!(entries[0].detail.contains("unexpected end"));
    }

    #[test]
    fn capacity_drops_oldest() {
        let diagnostics = Diagnostics::new(2);
        diagnostics.record("a", "1");
        diagnostics.record("b", "2");
        diagnostics.record("c", "3");
        let ops: Vec<_> = diagnostics
            .entries()
            .into_iter()
            .map(|d| d.operation)
            .collect();
        assert_eq!(ops, vec!["b", "c"]);
    }

    #[test]
    fn drain_empties_stream() {
        let diagnostics = Diagnostics::new(4);
        diagnostics.record("x", "y");
        assert_eq!(diagnostics.drain().len(), 1);
        assert!(diagnostics.is_empty());
    }
}
