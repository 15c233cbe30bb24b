// conformance-gate-cli/src/lib.rs
// ============================================================================
// Module: Conformance Gate CLI Library
// Description: Shared helpers for the Conformance Gate command-line interface.
// Purpose: Provide reusable components (message catalog) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library module houses the CLI message catalog. The binary entry point
//! (`src/main.rs`) routes every user-facing string through [`t!`] so output
//! stays consistent across commands.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and formatting helpers.
pub mod i18n;
