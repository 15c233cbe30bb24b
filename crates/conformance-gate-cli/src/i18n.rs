// conformance-gate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Provides the message catalog and formatting utilities for the CLI.
// Purpose: Centralize user-facing strings so commands report consistently.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Conformance Gate CLI stores user-facing strings in a small catalog.
//! All runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "conformance-gate {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize {kind} output: {error}"),
    ("property.invalid", "Invalid property '{value}': expected KEY=VALUE."),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("config.validate.corpus", "Corpus root: {path}"),
    ("config.validate.tiers", "Tiers: {tiers}"),
    ("config.validate.sta_override", "Baseline helper: {path} (suite.sta_override)"),
    (
        "config.validate.sta_upstream",
        "Baseline helper: {path} (upstream; set suite.sta_override to substitute it)",
    ),
    ("config.validate.engine_missing", "Note: no [engine] section; only `plan` is available."),
    ("tiers.invalid", "Invalid tier override: {error}"),
    ("directives.read_failed", "Failed to read directive file: {error}"),
    ("plan.failed", "Failed to plan the suite: {error}"),
    (
        "plan.summary",
        "Planned {configurations} configurations from {loaded} case files ({skipped} skipped, \
         {soft} soft-excluded, {hard} hard-excluded).",
    ),
    ("plan.tiers", "Tiers: {tiers}"),
    ("plan.skipped", "skipped {path}: {reason}"),
    ("plan.kind", "plan"),
    ("run.engine.invalid", "Invalid engine configuration: {error}"),
    ("run.engine.probe_failed", "Engine command is not usable: {error}"),
    ("run.diagnostics_log.open_failed", "Failed to open diagnostics log {path}: {error}"),
    ("run.failure", "FAIL {name}"),
    (
        "run.stale",
        "Stale exclusion: {path} passed in every configuration; remove it from the directive \
         file.",
    ),
    (
        "run.summary",
        "{total} configurations: {passed} passed, {expected} expected failures, {ignored} \
         ignored, {unexpected_failure} unexpected failures, {unexpected_pass} unexpected passes, \
         {harness} harness failures.",
    ),
    ("run.kind", "report"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Formats `key` using the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog used by the CLI.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
