// conformance-gate-config/src/lib.rs
// ============================================================================
// Module: Conformance Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for conformance-gate.toml semantics.
// Dependencies: conformance-gate-core, conformance-gate-engines, serde, toml
// ============================================================================

//! ## Overview
//! `conformance-gate-config` defines the configuration model for conformance
//! runs: corpus layout, execution matrix, skip policy, and the external
//! engine command. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
