// conformance-gate-core/src/runtime/expander.rs
// ============================================================================
// Module: Variant Expander
// Description: Expands case descriptors into tier x strict-mode configurations.
// Purpose: Apply unsupported-feature policy and per-case strictness flags.
// Dependencies: crate::{core, runtime::tally}
// ============================================================================

//! ## Overview
//! A case is skipped outright when it exercises an unsupported feature or
//! needs an unsupported host (module or async by default). Otherwise every
//! configured tier yields a non-strict and a strict configuration, filtered by
//! the `onlyStrict`, `noStrict` and `raw` flags.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::CaseDescriptor;
use crate::core::OptimizationTier;
use crate::core::RunConfiguration;
use crate::core::StrictMode;
use crate::core::flags;
use crate::runtime::tally::ExclusionTally;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Capabilities the engine under test lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionPolicy {
    /// Features whose cases are skipped.
    pub unsupported_features: BTreeSet<String>,
    /// Flags whose cases are skipped.
    pub unsupported_flags: BTreeSet<String>,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            unsupported_features: BTreeSet::new(),
            unsupported_flags: [flags::MODULE, flags::ASYNC].into_iter().map(String::from).collect(),
        }
    }
}

/// Reason a case produced no configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The case exercises an unsupported feature.
    UnsupportedFeature(String),
    /// The case needs an unsupported host environment.
    UnsupportedFlag(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFeature(feature) => write!(f, "unsupported feature '{feature}'"),
            Self::UnsupportedFlag(flag) => write!(f, "unsupported flag '{flag}'"),
        }
    }
}

// ============================================================================
// SECTION: Expander
// ============================================================================

/// Builds run configurations for case descriptors.
#[derive(Debug, Clone)]
pub struct VariantExpander {
    /// Skip policy.
    policy: ExpansionPolicy,
    /// Tiers every case runs at.
    tiers: Vec<OptimizationTier>,
}

impl VariantExpander {
    /// Creates an expander for the given policy and tier set.
    #[must_use]
    pub const fn new(policy: ExpansionPolicy, tiers: Vec<OptimizationTier>) -> Self {
        Self {
            policy,
            tiers,
        }
    }

    /// Returns the configured tiers.
    #[must_use]
    pub fn tiers(&self) -> &[OptimizationTier] {
        &self.tiers
    }

    /// Returns why a case is skipped, or `None` when it runs.
    #[must_use]
    pub fn skip_reason(&self, case: &CaseDescriptor) -> Option<SkipReason> {
        if let Some(feature) =
            case.features().iter().find(|feature| self.policy.unsupported_features.contains(*feature))
        {
            return Some(SkipReason::UnsupportedFeature(feature.clone()));
        }
        case.flags()
            .iter()
            .find(|flag| self.policy.unsupported_flags.contains(*flag))
            .map(|flag| SkipReason::UnsupportedFlag(flag.clone()))
    }

    /// Expands a case into its run configurations.
    ///
    /// Every configuration of a soft-excluded case is registered in the tally.
    pub fn expand(
        &self,
        case: &Arc<CaseDescriptor>,
        soft_excluded: bool,
        tally: &mut ExclusionTally,
    ) -> Vec<RunConfiguration> {
        if self.skip_reason(case).is_some() {
            return Vec::new();
        }
        let raw = case.has_flag(flags::RAW);
        let non_strict = !case.has_flag(flags::ONLY_STRICT) || raw;
        let strict = !case.has_flag(flags::NO_STRICT) && !raw;

        let mut configurations = Vec::new();
        for tier in &self.tiers {
            if non_strict {
                configurations.push(RunConfiguration::new(
                    Arc::clone(case),
                    *tier,
                    StrictMode::NonStrict,
                    soft_excluded,
                ));
            }
            if strict {
                configurations.push(RunConfiguration::new(
                    Arc::clone(case),
                    *tier,
                    StrictMode::Strict,
                    soft_excluded,
                ));
            }
        }
        if soft_excluded {
            for _ in &configurations {
                tally.record_generated(case.path());
            }
        }
        configurations
    }
}
