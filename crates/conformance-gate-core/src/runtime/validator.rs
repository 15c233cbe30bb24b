// conformance-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Outcome Validator
// Description: Classifies engine results against case expectations.
// Purpose: Implement the per-configuration verdict state machine.
// Dependencies: crate::{core, runtime::tally}
// ============================================================================

//! ## Overview
//! Each configuration starts pending and ends in exactly one [`Verdict`].
//! Soft-excluded configurations never produce a reported failure: errors are
//! ignored and passes decrement the file's tally entry so that stale
//! exclusions can be reported at the end of the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ActualResult;
use crate::core::RunConfiguration;
use crate::core::Verdict;
use crate::runtime::tally::ExclusionTally;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Compares actual results with declared expectations.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeValidator<'a> {
    /// Shared expected-failure tally.
    tally: &'a ExclusionTally,
}

impl<'a> OutcomeValidator<'a> {
    /// Creates a validator updating the given tally.
    #[must_use]
    pub const fn new(tally: &'a ExclusionTally) -> Self {
        Self {
            tally,
        }
    }

    /// Classifies the result of one configuration.
    #[must_use]
    pub fn validate(&self, config: &RunConfiguration, result: &ActualResult) -> Verdict {
        let case = config.case();
        match result {
            ActualResult::Completed => {
                if let Some(expected) = case.expected_error() {
                    if config.is_soft_excluded() {
                        return Verdict::Ignored;
                    }
                    return Verdict::UnexpectedPass {
                        reason: format!(
                            "Failed a negative test. Expected error: {} (at phase '{}')",
                            expected.kind,
                            expected.phase_label()
                        ),
                    };
                }
                if config.is_soft_excluded() {
                    self.tally.record_pass(config.path());
                }
                Verdict::Passed
            }
            ActualResult::ParseError(failure) | ActualResult::RuntimeError(failure) => {
                if config.is_soft_excluded() {
                    return Verdict::Ignored;
                }
                let Some(expected) = case.expected_error() else {
                    return Verdict::UnexpectedFailure {
                        reason: failure.to_string(),
                    };
                };
                let actual_kind = result.error_kind().unwrap_or_default();
                if expected.early && matches!(result, ActualResult::RuntimeError(_)) {
                    return Verdict::UnexpectedFailure {
                        reason: format!(
                            "Expected an early error: {}, got: {actual_kind} in the runtime",
                            expected.kind
                        ),
                    };
                }
                if actual_kind != expected.kind {
                    return Verdict::UnexpectedFailure {
                        reason: format!(
                            "{} expected:<{}> but was:<{actual_kind}>",
                            failure.details, expected.kind
                        ),
                    };
                }
                Verdict::ExpectedFailure
            }
        }
    }
}
