// conformance-gate-core/src/lib.rs
// ============================================================================
// Module: Conformance Gate Core Library
// Description: Public API surface for the Conformance Gate core.
// Purpose: Expose case types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Conformance Gate core selects conformance cases from a corpus, resolves the
//! exclusion directives that apply to them, expands every case into concrete
//! run configurations, and classifies the result an external evaluation
//! engine reports for each configuration. The engine, the corpus storage and
//! the diagnostics pipeline are reached only through the traits in
//! [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Corpus;
pub use interfaces::CorpusError;
pub use interfaces::DiagnosticSink;
pub use interfaces::Engine;
pub use interfaces::EntryKind;
pub use runtime::ASSERT_HELPER;
pub use runtime::CaseExecutor;
pub use runtime::CaseLoader;
pub use runtime::ConfigError;
pub use runtime::ConfigurationResult;
pub use runtime::ExclusionConfig;
pub use runtime::ExclusionResolver;
pub use runtime::ExclusionTally;
pub use runtime::ExpansionPolicy;
pub use runtime::FileDiagnosticSink;
pub use runtime::FsCorpus;
pub use runtime::HarnessCache;
pub use runtime::HarnessError;
pub use runtime::HarnessLayout;
pub use runtime::InMemoryCorpus;
pub use runtime::MemoryDiagnosticSink;
pub use runtime::NoopDiagnosticSink;
pub use runtime::OutcomeValidator;
pub use runtime::PlanError;
pub use runtime::PlanRequest;
pub use runtime::RunOutcome;
pub use runtime::STA_HELPER;
pub use runtime::SkipReason;
pub use runtime::SkippedCase;
pub use runtime::StderrDiagnosticSink;
pub use runtime::SuitePlan;
pub use runtime::SuiteReport;
pub use runtime::SuiteRunner;
pub use runtime::TeeDiagnosticSink;
pub use runtime::VariantExpander;
pub use runtime::plan_suite;
