// conformance-gate-core/src/runtime/sinks.rs
// ============================================================================
// Module: Diagnostic Sinks
// Description: Stderr, file, in-memory, and no-op diagnostic sinks.
// Purpose: Route diagnostics as JSON lines without a logging framework dependency.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Diagnostics are serialized as one JSON object per line. Write failures are
//! swallowed: diagnostics must never abort planning or execution.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::core::Diagnostic;
use crate::interfaces::DiagnosticSink;

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Diagnostic sink that writes JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Ok(payload) = serde_json::to_string(diagnostic) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Diagnostic sink that appends JSON lines to a file.
pub struct FileDiagnosticSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileDiagnosticSink {
    /// Opens the diagnostics log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Ok(payload) = serde_json::to_string(diagnostic)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: In-Memory Sink
// ============================================================================

/// Diagnostic sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnosticSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<Diagnostic>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic.clone());
        }
    }
}

// ============================================================================
// SECTION: No-op Sink
// ============================================================================

/// Diagnostic sink that drops every event.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _diagnostic: &Diagnostic) {}
}

/// Fans diagnostics out to several sinks.
pub struct TeeDiagnosticSink<'a> {
    /// Downstream sinks.
    sinks: Vec<&'a dyn DiagnosticSink>,
}

impl<'a> TeeDiagnosticSink<'a> {
    /// Creates a sink forwarding to every given sink.
    #[must_use]
    pub const fn new(sinks: Vec<&'a dyn DiagnosticSink>) -> Self {
        Self {
            sinks,
        }
    }
}

impl DiagnosticSink for TeeDiagnosticSink<'_> {
    fn record(&self, diagnostic: &Diagnostic) {
        for sink in &self.sinks {
            sink.record(diagnostic);
        }
    }
}
