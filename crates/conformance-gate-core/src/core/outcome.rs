// conformance-gate-core/src/core/outcome.rs
// ============================================================================
// Module: Conformance Outcomes
// Description: Engine results and the verdicts assigned to them.
// Purpose: Model the tri-state engine result and the validator state machine output.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The engine reports one of three results for a configuration: normal
//! completion, an error while compiling, or an error while executing. The two
//! error channels are distinct variants so that phase is never inferred from
//! the shape of an error. Verdicts are the terminal states of the validator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Error kind assigned to every compile-time failure.
pub const PARSE_ERROR_KIND: &str = "SyntaxError";

// ============================================================================
// SECTION: Engine Results
// ============================================================================

/// Error reported by the evaluation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// Error detail text, e.g. `TypeError: x is not a function`.
    pub details: String,
    /// Full message including source position when the engine provides it.
    pub message: String,
    /// Script-level stack trace when the engine provides it.
    pub trace: Option<String>,
}

impl EngineFailure {
    /// Creates a failure whose message equals its details.
    #[must_use]
    pub fn new(details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            message: details.clone(),
            details,
            trace: None,
        }
    }

    /// Attaches a stack trace.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Overrides the full message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(trace) = &self.trace {
            write!(f, "\n{trace}")?;
        }
        Ok(())
    }
}

/// Actual result of one run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActualResult {
    /// Compilation and execution completed normally.
    Completed,
    /// Compilation failed; execution never started.
    ParseError(EngineFailure),
    /// Execution started and raised an error.
    RuntimeError(EngineFailure),
}

impl ActualResult {
    /// Returns the engine failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&EngineFailure> {
        match self {
            Self::Completed => None,
            Self::ParseError(failure) | Self::RuntimeError(failure) => Some(failure),
        }
    }

    /// Returns the error kind used for comparison with expectations.
    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        match self {
            Self::Completed => None,
            Self::ParseError(_) => Some(PARSE_ERROR_KIND),
            Self::RuntimeError(failure) => Some(error_kind(&failure.details)),
        }
    }
}

/// Extracts the error kind from runtime error details.
///
/// The kind is the text before the first colon, or the whole text when there
/// is no colon.
#[must_use]
pub fn error_kind(details: &str) -> &str {
    details.split_once(':').map_or(details, |(kind, _)| kind)
}

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Terminal validator state for one run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The case completed and no error was expected.
    Passed,
    /// The case raised the expected error in the expected phase.
    ExpectedFailure,
    /// The case raised an error it should not have, or the wrong one.
    UnexpectedFailure {
        /// Human-readable failure report.
        reason: String,
    },
    /// The case completed although an error was expected.
    UnexpectedPass {
        /// Human-readable failure report.
        reason: String,
    },
    /// The case is soft-excluded and its failure was tolerated.
    Ignored,
}

impl Verdict {
    /// Returns the verdict kind without its payload.
    #[must_use]
    pub const fn kind(&self) -> VerdictKind {
        match self {
            Self::Passed => VerdictKind::Passed,
            Self::ExpectedFailure => VerdictKind::ExpectedFailure,
            Self::UnexpectedFailure {
                ..
            } => VerdictKind::UnexpectedFailure,
            Self::UnexpectedPass {
                ..
            } => VerdictKind::UnexpectedPass,
            Self::Ignored => VerdictKind::Ignored,
        }
    }

    /// Returns true when the verdict must be reported as a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedFailure {
                ..
            } | Self::UnexpectedPass {
                ..
            }
        )
    }

    /// Returns the failure report, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::UnexpectedFailure {
                reason,
            }
            | Self::UnexpectedPass {
                reason,
            } => Some(reason),
            _ => None,
        }
    }
}

/// Payload-free verdict classification used for tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    /// See [`Verdict::Passed`].
    Passed,
    /// See [`Verdict::ExpectedFailure`].
    ExpectedFailure,
    /// See [`Verdict::UnexpectedFailure`].
    UnexpectedFailure,
    /// See [`Verdict::UnexpectedPass`].
    UnexpectedPass,
    /// See [`Verdict::Ignored`].
    Ignored,
}

impl VerdictKind {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::ExpectedFailure => "expected_failure",
            Self::UnexpectedFailure => "unexpected_failure",
            Self::UnexpectedPass => "unexpected_pass",
            Self::Ignored => "ignored",
        }
    }
}
