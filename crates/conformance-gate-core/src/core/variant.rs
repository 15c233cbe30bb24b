// conformance-gate-core/src/core/variant.rs
// ============================================================================
// Module: Run Configurations
// Description: Concrete execution units derived from a case descriptor.
// Purpose: Pair a case with an optimization tier and a strict-mode variant.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`RunConfiguration`] is the unit of work handed to the engine. It shares
//! the case descriptor with every other configuration of the same file and is
//! consumed exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::core::case::CaseDescriptor;
use crate::core::identifiers::CasePath;
use crate::core::identifiers::OptimizationTier;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prologue prepended to the case body in strict-mode configurations.
pub const STRICT_PROLOGUE: &str = "\"use strict\";\n";

// ============================================================================
// SECTION: Strict Mode
// ============================================================================

/// Strict-mode variant of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictMode {
    /// Case body is evaluated as written.
    NonStrict,
    /// Case body is prefixed with the strict-mode prologue.
    Strict,
}

impl StrictMode {
    /// Returns true for the strict variant.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonStrict => "non-strict",
            Self::Strict => "strict",
        }
    }
}

// ============================================================================
// SECTION: Run Configuration
// ============================================================================

/// One concrete execution of a case.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Shared case descriptor.
    case: Arc<CaseDescriptor>,
    /// Optimization tier used to compile the case.
    tier: OptimizationTier,
    /// Strict-mode variant.
    strict: StrictMode,
    /// True when the case file is soft-excluded.
    soft_excluded: bool,
}

impl RunConfiguration {
    /// Creates a run configuration.
    #[must_use]
    pub const fn new(
        case: Arc<CaseDescriptor>,
        tier: OptimizationTier,
        strict: StrictMode,
        soft_excluded: bool,
    ) -> Self {
        Self {
            case,
            tier,
            strict,
            soft_excluded,
        }
    }

    /// Returns the case descriptor.
    #[must_use]
    pub fn case(&self) -> &CaseDescriptor {
        &self.case
    }

    /// Returns the case path.
    #[must_use]
    pub fn path(&self) -> &CasePath {
        self.case.path()
    }

    /// Returns the optimization tier.
    #[must_use]
    pub const fn tier(&self) -> OptimizationTier {
        self.tier
    }

    /// Returns the strict-mode variant.
    #[must_use]
    pub const fn strict(&self) -> StrictMode {
        self.strict
    }

    /// Returns true when the case file is soft-excluded.
    #[must_use]
    pub const fn is_soft_excluded(&self) -> bool {
        self.soft_excluded
    }

    /// Returns the source handed to the engine, with the prologue when strict.
    #[must_use]
    pub fn prepared_source(&self) -> Cow<'_, str> {
        if self.strict.is_strict() {
            Cow::Owned(format!("{STRICT_PROLOGUE}{}", self.case.source_text()))
        } else {
            Cow::Borrowed(self.case.source_text())
        }
    }
}

impl fmt::Display for RunConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [tier={}, {}]", self.case.path(), self.tier, self.strict.as_str())
    }
}
