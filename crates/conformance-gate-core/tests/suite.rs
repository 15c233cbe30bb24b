// crates/conformance-gate-core/tests/suite.rs
// ============================================================================
// Module: Suite Planning and Runner Tests
// Description: End-to-end planning and parallel execution of a corpus.
// ============================================================================
//! ## Overview
//! Plans a small corpus with soft, hard, and skipped cases, runs it on several
//! workers with the scripted engine, and checks the report and diagnostics.

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

mod common;

use std::fs;

use conformance_gate_core::CasePath;
use conformance_gate_core::ConfigError;
use conformance_gate_core::Diagnostic;
use conformance_gate_core::ExpansionPolicy;
use conformance_gate_core::FsCorpus;
use conformance_gate_core::HarnessLayout;
use conformance_gate_core::InMemoryCorpus;
use conformance_gate_core::MemoryDiagnosticSink;
use conformance_gate_core::NoopDiagnosticSink;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::PlanError;
use conformance_gate_core::PlanRequest;
use conformance_gate_core::RunOutcome;
use conformance_gate_core::SkipReason;
use conformance_gate_core::SuiteRunner;
use conformance_gate_core::VariantExpander;
use conformance_gate_core::VerdictKind;
use conformance_gate_core::plan_suite;

use crate::common::ScriptedEngine;
use crate::common::case_source;
use crate::common::corpus_with_harness;
use crate::common::layout;
use crate::common::tiers;

const DIRECTIVES: &str = "\
# language tests
test/lang
!fixed.js
!still-broken.js
!!crashes.js
";

fn corpus() -> InMemoryCorpus {
    corpus_with_harness()
        .with_file("test/lang/plain.js", case_source("description: plain", "1;"))
        .with_file(
            "test/lang/negative.js",
            case_source("negative:\n  type: SyntaxError\n  phase: early", "// compile-error: x"),
        )
        .with_file("test/lang/fixed.js", case_source("flags: [noStrict]", "1;"))
        .with_file(
            "test/lang/still-broken.js",
            case_source("flags: [onlyStrict]", "// runtime-error: TypeError: nope"),
        )
        .with_file("test/lang/crashes.js", "no metadata, never loaded")
        .with_file("test/lang/module.js", case_source("flags: [module]", "export {};"))
        .with_file(
            "test/lang/regress.js",
            case_source("includes: [compareArray.js]", "// runtime-error: Test262Error: regressed"),
        )
}

/// Tests that planning selects, skips, and expands cases.
#[test]
fn plan_expands_selected_cases() {
    let corpus = corpus();
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let sink = MemoryDiagnosticSink::new();
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: DIRECTIVES,
            layout: &layout,
            expander: &expander,
            filter: None,
            match_prefix: None,
        },
        &sink,
    )
    .expect("plan");

    assert!(plan.exclusions().is_hard_excluded(&CasePath::new("test/lang/crashes.js")));
    assert_eq!(plan.loaded(), 6);
    assert_eq!(plan.skipped().len(), 1);
    assert_eq!(plan.skipped()[0].reason, SkipReason::UnsupportedFlag("module".to_string()));
    // plain 6 + negative 6 + fixed 3 + still-broken 3 + regress 6
    assert_eq!(plan.configurations().len(), 24);
    assert_eq!(plan.tally().len(), 2);
    assert_eq!(plan.tally().generated(&CasePath::new("test/lang/fixed.js")), Some(3));
    assert!(
        plan.configurations()
            .iter()
            .all(|config| config.path().as_str() != "test/lang/crashes.js")
    );
    assert_eq!(sink.events(), vec![Diagnostic::CaseSkipped {
        path: CasePath::new("test/lang/module.js"),
        reason: "unsupported flag 'module'".to_string(),
    }]);
}

/// Tests that a run reports failures, tolerated errors, and stale exclusions.
#[test]
fn run_reports_verdicts_and_stale_exclusions() {
    let corpus = corpus();
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: DIRECTIVES,
            layout: &layout,
            expander: &expander,
            filter: None,
            match_prefix: None,
        },
        &NoopDiagnosticSink,
    )
    .expect("plan");

    let engine = ScriptedEngine::new();
    let sink = MemoryDiagnosticSink::new();
    let report = SuiteRunner::new(4).run(&plan, &engine, &corpus, &sink);

    assert_eq!(report.results.len(), 24);
    let counts = report.verdict_counts();
    assert_eq!(counts.get(&VerdictKind::Passed), Some(&9));
    assert_eq!(counts.get(&VerdictKind::ExpectedFailure), Some(&6));
    assert_eq!(counts.get(&VerdictKind::Ignored), Some(&3));
    assert_eq!(counts.get(&VerdictKind::UnexpectedFailure), Some(&6));
    assert_eq!(report.harness_failures(), 0);
    assert!(!report.is_success());
    assert!(report.failures().all(|result| result.path.as_str() == "test/lang/regress.js"));

    assert_eq!(report.stale_exclusions, vec![CasePath::new("test/lang/fixed.js")]);
    assert_eq!(sink.events(), vec![Diagnostic::StaleExclusion {
        path: CasePath::new("test/lang/fixed.js"),
    }]);

    for (config, result) in plan.configurations().iter().zip(&report.results) {
        assert_eq!(config.to_string(), result.name());
    }
}

/// Tests that worker count does not change the report.
#[test]
fn report_is_independent_of_worker_count() {
    let corpus = corpus();
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let request = PlanRequest {
        directives: DIRECTIVES,
        layout: &layout,
        expander: &expander,
        filter: None,
        match_prefix: None,
    };
    let engine = ScriptedEngine::new();

    let single = plan_suite(&corpus, request, &NoopDiagnosticSink).unwrap();
    let single = SuiteRunner::new(1).run(&single, &engine, &corpus, &NoopDiagnosticSink);
    let many = plan_suite(&corpus, request, &NoopDiagnosticSink).unwrap();
    let many = SuiteRunner::new(16).run(&many, &engine, &corpus, &NoopDiagnosticSink);
    assert_eq!(single.results, many.results);
    assert_eq!(single.stale_exclusions, many.stale_exclusions);
    assert!(SuiteRunner::new(0).workers() >= 1);
}

/// Tests that missing helpers surface as harness failures.
#[test]
fn missing_helpers_are_harness_failures() {
    let corpus = InMemoryCorpus::new().with_file("t/a.js", case_source("description: a", "1;"));
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), vec![OptimizationTier::COMPILED]);
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: "t\n!a.js",
            layout: &layout,
            expander: &expander,
            filter: None,
            match_prefix: None,
        },
        &NoopDiagnosticSink,
    )
    .unwrap();
    let report = SuiteRunner::new(2).run(&plan, &ScriptedEngine::new(), &corpus, &NoopDiagnosticSink);
    assert_eq!(report.harness_failures(), 2);
    assert!(report.results.iter().all(|result| matches!(
        &result.outcome,
        RunOutcome::HarnessFailure { reason } if reason.contains("harness/assert.js")
    )));
    assert!(report.stale_exclusions.is_empty());
}

/// Tests that an engine panic fails only the configuration that raised it.
#[test]
fn engine_panics_are_isolated_per_configuration() {
    let corpus = InMemoryCorpus::new()
        .with_file("t/a.js", case_source("flags: [raw]", "1;"))
        .with_file("t/b.js", case_source("flags: [raw]", "// engine-panic: engine crashed"))
        .with_file("t/c.js", case_source("flags: [raw]", "1;"));
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), vec![OptimizationTier::COMPILED]);
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: "t\n",
            layout: &layout,
            expander: &expander,
            filter: None,
            match_prefix: None,
        },
        &NoopDiagnosticSink,
    )
    .unwrap();
    assert_eq!(plan.configurations().len(), 3);

    let report = SuiteRunner::new(1).run(&plan, &ScriptedEngine::new(), &corpus, &NoopDiagnosticSink);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.harness_failures(), 1);
    assert_eq!(report.verdict_counts().get(&VerdictKind::Passed), Some(&2));
    for result in &report.results {
        match result.path.as_str() {
            "t/b.js" => assert!(matches!(
                &result.outcome,
                RunOutcome::HarnessFailure { reason } if reason.contains("panicked")
            )),
            _ => assert!(matches!(&result.outcome, RunOutcome::Verdict { .. })),
        }
    }
}

/// Tests that the filter restricts planning to matching paths.
#[test]
fn filter_restricts_plan() {
    let corpus = corpus();
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: DIRECTIVES,
            layout: &layout,
            expander: &expander,
            filter: Some("plain"),
            match_prefix: None,
        },
        &NoopDiagnosticSink,
    )
    .unwrap();
    assert_eq!(plan.loaded(), 1);
    assert_eq!(plan.configurations().len(), 6);
    assert!(plan.tally().is_empty());
}

/// Tests that invalid metadata and directives abort planning.
#[test]
fn planning_errors_are_fatal() {
    let corpus = corpus().with_file("test/bad/broken.js", "var x;");
    let layout = layout();
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let request = |directives: &'static str| PlanRequest {
        directives,
        layout: &layout,
        expander: &expander,
        filter: None,
        match_prefix: None,
    };

    let err = plan_suite(&corpus, request("test/bad"), &NoopDiagnosticSink).unwrap_err();
    assert!(matches!(err, PlanError::Metadata { ref path, .. } if path.as_str() == "test/bad/broken.js"));

    let err = plan_suite(&corpus, request("!orphan.js"), &NoopDiagnosticSink).unwrap_err();
    assert!(matches!(err, PlanError::Config(ConfigError::OrphanExclusion { .. })));
}

/// Tests a full run over an on-disk corpus.
#[test]
fn filesystem_corpus_runs_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let harness = root.join("harness");
    let tests = root.join("test/built-ins");
    fs::create_dir_all(&harness).unwrap();
    fs::create_dir_all(&tests).unwrap();
    fs::write(harness.join("assert.js"), "var assert;").unwrap();
    fs::write(harness.join("sta.js"), "var Test262Error;").unwrap();
    fs::write(tests.join("ok.js"), case_source("flags: [onlyStrict]", "1;")).unwrap();

    let corpus = FsCorpus::new(root);
    let layout = HarnessLayout::new(harness.display().to_string(), None);
    let expander = VariantExpander::new(ExpansionPolicy::default(), tiers());
    let plan = plan_suite(
        &corpus,
        PlanRequest {
            directives: "test/built-ins\n",
            layout: &layout,
            expander: &expander,
            filter: None,
            match_prefix: None,
        },
        &NoopDiagnosticSink,
    )
    .unwrap();
    let report = SuiteRunner::new(2).run(&plan, &ScriptedEngine::new(), &corpus, &NoopDiagnosticSink);
    assert_eq!(report.results.len(), 3);
    assert!(report.is_success());
}
