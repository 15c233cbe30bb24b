// conformance-gate-core/src/core/mod.rs
// ============================================================================
// Module: Conformance Gate Core Types
// Description: Case descriptors, run configurations, outcomes, and diagnostics.
// Purpose: Provide stable, strongly typed values shared by every runtime stage.
// Dependencies: serde, serde_yaml
// ============================================================================

//! ## Overview
//! Core types describe a conformance case after its metadata has been decoded,
//! the concrete run configurations derived from it, the tri-state result an
//! engine reports, and the verdict the validator assigns to that result.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod case;
pub mod diagnostics;
pub mod identifiers;
pub mod outcome;
pub mod variant;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::CaseDescriptor;
pub use case::ExpectedError;
pub use case::MetadataError;
pub use case::flags;
pub use diagnostics::Diagnostic;
pub use identifiers::CasePath;
pub use identifiers::HelperScript;
pub use identifiers::OptimizationTier;
pub use outcome::ActualResult;
pub use outcome::EngineFailure;
pub use outcome::PARSE_ERROR_KIND;
pub use outcome::Verdict;
pub use outcome::VerdictKind;
pub use outcome::error_kind;
pub use variant::RunConfiguration;
pub use variant::StrictMode;
