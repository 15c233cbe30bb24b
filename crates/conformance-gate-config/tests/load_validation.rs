//! File loading tests for conformance-gate-config.
// conformance-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Loading Tests
// Description: Validate file loading limits and directive file reads.
// Purpose: Ensure config and directive files fail closed on bad input.
// =============================================================================

#![allow(
    clippy::use_debug,
    reason = "Test-only debug formatting in assertion messages is permitted."
)]

use std::fs;

use conformance_gate_config::ConformanceConfig;
use conformance_gate_config::ConformanceConfigError;

mod common;

type TestResult = Result<(), String>;

#[test]
fn load_resolves_paths_against_config_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("conformance-gate.toml");
    let body = format!("[suite]\nroot = \"suite\"\nexclusions = \"rules.properties\"\n{}", common::ENGINE_SECTION);
    fs::write(&path, body).map_err(|err| err.to_string())?;
    fs::write(dir.path().join("rules.properties"), "built-ins/Array\n")
        .map_err(|err| err.to_string())?;

    let config = ConformanceConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.base_dir() != dir.path() {
        return Err(format!("unexpected base dir {}", config.base_dir().display()));
    }
    if config.corpus_root() != dir.path().join("suite").join("test") {
        return Err(format!("unexpected corpus root {}", config.corpus_root().display()));
    }
    let directives = config.read_directives().map_err(|err| err.to_string())?;
    if directives != "built-ins/Array\n" {
        return Err(format!("unexpected directives {directives:?}"));
    }
    Ok(())
}

#[test]
fn missing_config_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match ConformanceConfig::load(Some(&dir.path().join("absent.toml"))) {
        Err(ConformanceConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_config_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    match ConformanceConfig::load(Some(&path)) {
        Err(ConformanceConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size error, got {other:?}")),
    }
}

#[test]
fn non_utf8_config_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match ConformanceConfig::load(Some(&path)) {
        Err(ConformanceConfigError::Invalid(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 error, got {other:?}")),
    }
}

#[test]
fn missing_directive_file_names_the_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let config = common::config_from_toml("", dir.path()).map_err(|err| err.to_string())?;
    match config.read_directives() {
        Err(ConformanceConfigError::Io(message)) if message.contains("test262.properties") => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}
