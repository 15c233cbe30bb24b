// conformance-gate-engines/src/lib.rs
// ============================================================================
// Module: Conformance Gate Engines Library
// Description: Engine adapters for the conformance orchestrator.
// Purpose: Connect external evaluators to the core engine interface.
// Dependencies: conformance-gate-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Engine adapters implement [`conformance_gate_core::Engine`] on top of
//! evaluators that live outside this process.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod process;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use process::FILENAME_ENV_VAR;
pub use process::ProcessEngine;
pub use process::ProcessEngineConfig;
pub use process::ProcessEngineError;
pub use process::ProcessScope;
pub use process::ProcessUnit;
pub use process::TIER_ENV_VAR;
