// conformance-gate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and report formatting.
// Purpose: Ensure property overrides parse and summaries count every verdict.
// Dependencies: conformance-gate-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `-D` property parsing, global flag placement, and summary
//! formatting for reports.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use conformance_gate_core::CasePath;
use conformance_gate_core::ConfigurationResult;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::RunOutcome;
use conformance_gate_core::StrictMode;
use conformance_gate_core::SuiteReport;
use conformance_gate_core::Verdict;

use super::Cli;
use super::Commands;
use super::join_tiers;
use super::parse_property;
use super::property_map;
use super::report_summary;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn result(path: &str, outcome: RunOutcome) -> ConfigurationResult {
    ConfigurationResult {
        path: CasePath::new(path),
        tier: OptimizationTier::COMPILED,
        strict: StrictMode::Strict,
        outcome,
    }
}

fn verdict(verdict: Verdict) -> RunOutcome {
    RunOutcome::Verdict {
        verdict,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn parse_property_splits_on_first_equals() {
    assert_eq!(
        parse_property("TEST_OPTLEVEL=9").unwrap(),
        ("TEST_OPTLEVEL".to_string(), "9".to_string())
    );
    assert_eq!(parse_property("a=b=c").unwrap(), ("a".to_string(), "b=c".to_string()));
    assert_eq!(parse_property("empty=").unwrap(), ("empty".to_string(), String::new()));
}

#[test]
fn parse_property_rejects_missing_key() {
    let err = parse_property("=9").unwrap_err();
    assert!(err.contains("expected KEY=VALUE"), "unexpected error: {err}");
    assert!(parse_property("TEST_OPTLEVEL").is_err());
}

#[test]
fn later_properties_win() {
    let map = property_map(&[
        ("TEST_OPTLEVEL".to_string(), "0".to_string()),
        ("TEST_OPTLEVEL".to_string(), "9".to_string()),
    ]);
    assert_eq!(map.get("TEST_OPTLEVEL").map(String::as_str), Some("9"));
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = Cli::try_parse_from([
        "conformance-gate",
        "run",
        "--filter",
        "Array",
        "--config",
        "suite.toml",
        "-D",
        "TEST_OPTLEVEL=-1",
    ])
    .unwrap();
    assert_eq!(cli.global.config.as_deref(), Some(std::path::Path::new("suite.toml")));
    assert_eq!(cli.global.properties, vec![("TEST_OPTLEVEL".to_string(), "-1".to_string())]);
    match cli.command {
        Some(Commands::Run(command)) => {
            assert_eq!(command.filter.as_deref(), Some("Array"));
            assert!(command.workers.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn join_tiers_lists_levels_in_order() {
    assert_eq!(join_tiers(&OptimizationTier::default_matrix()), "-1, 0, 9");
}

#[test]
fn report_summary_counts_every_verdict_kind() {
    let report = SuiteReport {
        results: vec![
            result("a.js", verdict(Verdict::Passed)),
            result("b.js", verdict(Verdict::Passed)),
            result("c.js", verdict(Verdict::ExpectedFailure)),
            result("d.js", verdict(Verdict::Ignored)),
            result(
                "e.js",
                verdict(Verdict::UnexpectedFailure {
                    reason: "TypeError: boom".to_string(),
                }),
            ),
            result(
                "f.js",
                RunOutcome::HarnessFailure {
                    reason: "missing helper".to_string(),
                },
            ),
        ],
        stale_exclusions: Vec::new(),
    };
    assert_eq!(
        report_summary(&report),
        "6 configurations: 2 passed, 1 expected failures, 1 ignored, 1 unexpected failures, 0 \
         unexpected passes, 1 harness failures."
    );
    assert!(!report.is_success());
}
