// conformance-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Conformance Runtime
// Description: Planning, execution, and validation of conformance runs.
// Purpose: Expose the resolver, loader, expander, executor, and suite runner.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime turns a directive list and a corpus into a plan of run
//! configurations, executes them against an [`crate::interfaces::Engine`], and
//! classifies each result into a verdict.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod corpus;
pub mod exclusions;
pub mod executor;
pub mod expander;
pub mod harness_cache;
pub mod loader;
pub mod sinks;
pub mod suite;
pub mod tally;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use corpus::FsCorpus;
pub use corpus::InMemoryCorpus;
pub use exclusions::ConfigError;
pub use exclusions::ExclusionConfig;
pub use exclusions::ExclusionResolver;
pub use executor::CaseExecutor;
pub use expander::ExpansionPolicy;
pub use expander::SkipReason;
pub use expander::VariantExpander;
pub use harness_cache::HarnessCache;
pub use harness_cache::HarnessError;
pub use loader::ASSERT_HELPER;
pub use loader::CaseLoader;
pub use loader::HarnessLayout;
pub use loader::STA_HELPER;
pub use sinks::FileDiagnosticSink;
pub use sinks::MemoryDiagnosticSink;
pub use sinks::NoopDiagnosticSink;
pub use sinks::StderrDiagnosticSink;
pub use sinks::TeeDiagnosticSink;
pub use suite::ConfigurationResult;
pub use suite::PlanError;
pub use suite::PlanRequest;
pub use suite::RunOutcome;
pub use suite::SkippedCase;
pub use suite::SuitePlan;
pub use suite::SuiteReport;
pub use suite::SuiteRunner;
pub use suite::plan_suite;
pub use tally::ExclusionTally;
pub use validator::OutcomeValidator;
