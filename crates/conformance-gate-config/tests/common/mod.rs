// conformance-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for conformance-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::Path;

use conformance_gate_config::ConformanceConfig;
use conformance_gate_config::ConformanceConfigError;

/// Parses a TOML string into a `ConformanceConfig` rooted at `base_dir`.
pub fn config_from_toml(
    toml_str: &str,
    base_dir: &Path,
) -> Result<ConformanceConfig, ConformanceConfigError> {
    ConformanceConfig::from_toml_str(toml_str, base_dir)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<ConformanceConfig, ConformanceConfigError> {
    config_from_toml("", Path::new("/suite"))
}

/// Minimal engine section used by tests that need a runnable config.
pub const ENGINE_SECTION: &str = "[engine]\ncommand = \"sh\"\ncheck_args = [\"-n\"]\n";
