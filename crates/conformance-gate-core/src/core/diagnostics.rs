// conformance-gate-core/src/core/diagnostics.rs
// ============================================================================
// Module: Conformance Diagnostics
// Description: Non-fatal diagnostic events emitted while planning and running.
// Purpose: Give warnings a typed, serializable shape independent of the sink.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Diagnostics never change a verdict or abort a run. They are handed to a
//! [`crate::interfaces::DiagnosticSink`] which decides where they go.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::identifiers::CasePath;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Non-fatal diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A `raw` case also declares includes; the includes are still loaded.
    RawCaseWithIncludes {
        /// Case path.
        path: CasePath,
    },
    /// An exclusion directive matched no discovered file.
    UnmatchedExclusion {
        /// 1-based line number in the directive file.
        line: usize,
        /// Directive text as written.
        directive: String,
    },
    /// A soft-excluded file passed in every configuration.
    StaleExclusion {
        /// Case path.
        path: CasePath,
    },
    /// A selected case produced no configuration.
    CaseSkipped {
        /// Case path.
        path: CasePath,
        /// Skip reason.
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RawCaseWithIncludes {
                path,
            } => write!(f, "case '{path}' is flagged as 'raw' but also has defined includes"),
            Self::UnmatchedExclusion {
                line,
                directive,
            } => write!(f, "exclusion '{directive}' at line #{line} doesn't exclude anything"),
            Self::StaleExclusion {
                path,
            } => write!(f, "case is marked as failing but it does not: {path}"),
            Self::CaseSkipped {
                path,
                reason,
            } => write!(f, "case '{path}' skipped: {reason}"),
        }
    }
}
