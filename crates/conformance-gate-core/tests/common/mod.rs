// crates/conformance-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Conformance Gate Test Helpers
// Description: Scripted engine and corpus builders for integration tests.
// ============================================================================
//! ## Overview
//! [`ScriptedEngine`] interprets marker comments instead of evaluating code:
//! `// compile-error: <details>` fails compilation, `// runtime-error:
//! <details>` fails execution, `// sloppy-error: <details>` fails execution
//! only without the strict prologue, and `// requires: <name>` fails
//! execution unless a unit whose filename ends with `<name>` already ran in
//! the scope. `// engine-panic: <message>` panics inside `execute`.

#![allow(
    dead_code,
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

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use conformance_gate_core::EngineFailure;
use conformance_gate_core::Engine;
use conformance_gate_core::HarnessLayout;
use conformance_gate_core::InMemoryCorpus;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::variant::STRICT_PROLOGUE;

/// Harness directory used by the in-memory fixtures.
pub const HARNESS_DIR: &str = "harness";

/// Compiled unit of the scripted engine.
#[derive(Debug, Clone)]
pub struct ScriptedUnit {
    pub filename: String,
    pub source: String,
}

/// Engine driven by marker comments in the source text.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    compiles: AtomicUsize,
    executions: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `compile` calls, helpers included.
    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls, helpers included.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

fn marker<'s>(source: &'s str, name: &str) -> Option<&'s str> {
    let needle = format!("// {name}: ");
    source.lines().find_map(|line| line.trim().strip_prefix(needle.as_str()))
}

fn failure(details: &str) -> EngineFailure {
    EngineFailure::new(details).with_trace("\tat scripted:1")
}

impl Engine for ScriptedEngine {
    type Unit = ScriptedUnit;
    type Scope = Vec<String>;

    fn new_scope(&self, _tier: OptimizationTier) -> Self::Scope {
        Vec::new()
    }

    fn compile(
        &self,
        source: &str,
        filename: &str,
        _tier: OptimizationTier,
    ) -> Result<Self::Unit, EngineFailure> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if let Some(details) = marker(source, "compile-error") {
            return Err(failure(details));
        }
        Ok(ScriptedUnit {
            filename: filename.to_string(),
            source: source.to_string(),
        })
    }

    fn execute(&self, unit: &Self::Unit, scope: &mut Self::Scope) -> Result<(), EngineFailure> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = marker(&unit.source, "engine-panic") {
            panic!("{message}");
        }
        if let Some(name) = marker(&unit.source, "requires")
            && !scope.iter().any(|loaded| loaded.ends_with(name))
        {
            return Err(failure(&format!("ReferenceError: {name} is not loaded")));
        }
        if let Some(details) = marker(&unit.source, "runtime-error") {
            return Err(failure(details));
        }
        if !unit.source.starts_with(STRICT_PROLOGUE)
            && let Some(details) = marker(&unit.source, "sloppy-error")
        {
            return Err(failure(details));
        }
        scope.push(unit.filename.clone());
        Ok(())
    }
}

/// Builds a case source with the given metadata body.
pub fn case_source(metadata: &str, body: &str) -> String {
    format!("// Copyright\n/*---\n{metadata}\n---*/\n{body}\n")
}

/// Harness layout matching [`corpus_with_harness`].
pub fn layout() -> HarnessLayout {
    HarnessLayout::new(HARNESS_DIR, None)
}

/// In-memory corpus with working default helpers.
pub fn corpus_with_harness() -> InMemoryCorpus {
    InMemoryCorpus::new()
        .with_helper("harness/assert.js", "var assert = {};")
        .with_helper("harness/sta.js", "var Test262Error = {};")
        .with_helper("harness/compareArray.js", "// requires: assert.js")
        .with_helper("harness/propertyHelper.js", "// requires: sta.js")
}

/// The default three-tier matrix.
pub fn tiers() -> Vec<OptimizationTier> {
    OptimizationTier::default_matrix().to_vec()
}
