// crates/conformance-gate-core/tests/exclusions.rs
// ============================================================================
// Module: Exclusion Resolver Tests
// Description: Directive grammar, exclusion severities, and fatal errors.
// ============================================================================
//! ## Overview
//! Resolves directive lists against in-memory and on-disk corpora and checks
//! the selected, soft-excluded, and hard-excluded sets.

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

use std::fs;

use conformance_gate_core::CasePath;
use conformance_gate_core::ConfigError;
use conformance_gate_core::Diagnostic;
use conformance_gate_core::ExclusionConfig;
use conformance_gate_core::ExclusionResolver;
use conformance_gate_core::FsCorpus;
use conformance_gate_core::InMemoryCorpus;
use conformance_gate_core::MemoryDiagnosticSink;
use conformance_gate_core::NoopDiagnosticSink;

fn corpus() -> InMemoryCorpus {
    InMemoryCorpus::new()
        .with_file("tests/foo/bar.js", "")
        .with_file("tests/foo/baz.js", "")
        .with_file("tests/foo/nested/qux.js", "")
        .with_file("tests/foo/helper_FIXTURE.js", "")
        .with_file("tests/foo/notes.txt", "")
        .with_file("tests/other/one.js", "")
        .with_file("tests/other/two.js", "")
}

fn paths(items: &[&str]) -> Vec<CasePath> {
    items.iter().map(|item| CasePath::new(*item)).collect()
}

fn resolve(text: &str) -> Result<ExclusionConfig, ConfigError> {
    let corpus = corpus();
    ExclusionResolver::new(&corpus, &NoopDiagnosticSink).resolve(text)
}

/// Tests that a soft exclusion keeps the file selected.
#[test]
fn soft_exclusion_keeps_file_selected() {
    let config = resolve("tests/foo/\n!bar.js\n").expect("resolve");
    assert_eq!(
        config.selected(),
        paths(&["tests/foo/bar.js", "tests/foo/baz.js", "tests/foo/nested/qux.js"]).as_slice()
    );
    assert!(config.is_soft_excluded(&CasePath::new("tests/foo/bar.js")));
    assert!(!config.is_soft_excluded(&CasePath::new("tests/foo/baz.js")));
    assert!(config.hard_excluded().is_empty());
}

/// Tests that an unmatched exclusion only warns.
#[test]
fn unmatched_exclusion_warns_without_changes() {
    let corpus = corpus();
    let sink = MemoryDiagnosticSink::new();
    let config = ExclusionResolver::new(&corpus, &sink)
        .resolve("# suite\ntests/foo\n!!nomatch.js\n")
        .expect("resolve");
    assert!(config.soft_excluded().is_empty());
    assert!(config.hard_excluded().is_empty());
    assert_eq!(config.selected().len(), 3);
    assert_eq!(sink.events(), vec![Diagnostic::UnmatchedExclusion {
        line: 3,
        directive: "!!nomatch.js".to_string(),
    }]);
}

/// Tests that hard-excluded files leave the selection.
#[test]
fn hard_exclusion_removes_file_from_selection() {
    let config = resolve("tests/foo\n!! nested/qux.js\n!baz.js").expect("resolve");
    assert_eq!(config.selected(), paths(&["tests/foo/bar.js", "tests/foo/baz.js"]).as_slice());
    assert!(config.is_hard_excluded(&CasePath::new("tests/foo/nested/qux.js")));
    assert!(config.is_soft_excluded(&CasePath::new("tests/foo/baz.js")));
}

/// Tests that a hard exclusion wins over a later include of the same file.
#[test]
fn hard_exclusion_wins_over_explicit_file() {
    let config = resolve("tests/foo\n!!bar.js\ntests/foo/bar.js\n").expect("resolve");
    assert!(!config.selected().contains(&CasePath::new("tests/foo/bar.js")));
    assert!(config.is_hard_excluded(&CasePath::new("tests/foo/bar.js")));
}

/// Tests that a suffix may spell out the corpus location.
#[test]
fn suffix_may_include_corpus_location() {
    let corpus = corpus();
    let sink = MemoryDiagnosticSink::new();
    let text = "tests/foo\n!test262/tests/foo/bar.js\n!!suite/tests/foo/baz.js\n";
    let config = ExclusionResolver::new(&corpus, &sink)
        .with_match_prefix(Some("test262/"))
        .resolve(text)
        .expect("resolve");
    assert!(config.is_soft_excluded(&CasePath::new("tests/foo/bar.js")));
    assert!(!config.is_hard_excluded(&CasePath::new("tests/foo/baz.js")));
    assert_eq!(sink.events(), vec![Diagnostic::UnmatchedExclusion {
        line: 3,
        directive: "!!suite/tests/foo/baz.js".to_string(),
    }]);

    let unprefixed = ExclusionResolver::new(&corpus, &NoopDiagnosticSink)
        .resolve(text)
        .expect("resolve");
    assert!(unprefixed.soft_excluded().is_empty());
}

/// Tests that a suffix matches every file in the block ending with it.
#[test]
fn suffix_matches_multiple_files() {
    let config = resolve("tests/foo\n!.js\n").expect("resolve");
    assert_eq!(config.soft_excluded().len(), 3);
}

/// Tests that exclusions only apply to the block they follow.
#[test]
fn exclusions_are_scoped_to_their_block() {
    let config = resolve("tests/other\n!one.js\ntests/foo\n!bar.js\n").expect("resolve");
    assert_eq!(config.selected().len(), 5);
    assert_eq!(config.soft_excluded().len(), 2);
    assert!(config.is_soft_excluded(&CasePath::new("tests/other/one.js")));
    assert!(config.is_soft_excluded(&CasePath::new("tests/foo/bar.js")));
}

/// Tests that files selected twice appear once, in first-discovery order.
#[test]
fn selection_is_deduplicated() {
    let config = resolve("tests/other/two.js\ntests/other\n").expect("resolve");
    assert_eq!(config.selected(), paths(&["tests/other/two.js", "tests/other/one.js"]).as_slice());
}

/// Tests that blank lines and comments inside a block do not close it.
#[test]
fn comments_do_not_close_block() {
    let config = resolve("tests/foo\n\n  # known failures\n   !bar.js  \n").expect("resolve");
    assert!(config.is_soft_excluded(&CasePath::new("tests/foo/bar.js")));
}

/// Tests that a missing path fails with its line number.
#[test]
fn missing_path_is_fatal() {
    let err = resolve("tests/foo\n\ntests/missing\n").unwrap_err();
    match err {
        ConfigError::MissingPath {
            line,
            directive,
        } => {
            assert_eq!(line, 3);
            assert_eq!(directive, "tests/missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Tests that an exclusion outside a directory block is fatal.
#[test]
fn orphan_exclusion_is_fatal() {
    assert!(matches!(resolve("!bar.js"), Err(ConfigError::OrphanExclusion { line: 1, .. })));
    assert!(matches!(
        resolve("tests/other/one.js\n!one.js"),
        Err(ConfigError::OrphanExclusion { line: 2, .. })
    ));
}

/// Tests that an exclusion without a suffix is fatal.
#[test]
fn empty_exclusion_is_fatal() {
    assert!(matches!(resolve("tests/foo\n!!"), Err(ConfigError::EmptyExclusion { line: 2 })));
    assert!(matches!(resolve("tests/foo\n!  "), Err(ConfigError::EmptyExclusion { line: 2 })));
}

/// Tests that directives cannot escape the corpus.
#[test]
fn escaping_paths_are_rejected() {
    assert!(matches!(resolve("../secrets"), Err(ConfigError::InvalidPath { line: 1, .. })));
    assert!(matches!(resolve("/etc"), Err(ConfigError::InvalidPath { line: 1, .. })));
    assert!(matches!(resolve("tests/../tests/foo"), Err(ConfigError::InvalidPath { .. })));
}

/// Tests that resolving twice yields identical results.
#[test]
fn resolution_is_idempotent() {
    let text = "tests/foo\n!bar.js\n!!qux.js\ntests/other\n";
    assert_eq!(resolve(text).expect("first"), resolve(text).expect("second"));
}

/// Tests resolution against a directory tree on disk.
#[test]
fn filesystem_corpus_resolves_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("test/built-ins/Array/from")).unwrap();
    fs::create_dir_all(root.join("test/language")).unwrap();
    fs::write(root.join("test/built-ins/Array/from/a.js"), "").unwrap();
    fs::write(root.join("test/built-ins/Array/from/b.js"), "").unwrap();
    fs::write(root.join("test/built-ins/Array/from/c_FIXTURE.js"), "").unwrap();
    fs::write(root.join("test/built-ins/Array/length.js"), "").unwrap();
    fs::write(root.join("test/language/x.js"), "").unwrap();

    let corpus = FsCorpus::new(root);
    let sink = MemoryDiagnosticSink::new();
    let config = ExclusionResolver::new(&corpus, &sink)
        .resolve("test/built-ins/Array\n!from/b.js\n!!length.js\ntest/language/x.js\n")
        .expect("resolve");
    assert_eq!(
        config.selected(),
        paths(&["test/built-ins/Array/from/a.js", "test/built-ins/Array/from/b.js", "test/language/x.js"])
            .as_slice()
    );
    assert!(config.is_soft_excluded(&CasePath::new("test/built-ins/Array/from/b.js")));
    assert!(config.is_hard_excluded(&CasePath::new("test/built-ins/Array/length.js")));
    assert!(sink.events().is_empty());
}
