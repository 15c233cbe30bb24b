// conformance-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Conformance Gate Interfaces
// Description: Contracts for the evaluation engine, corpus storage, and diagnostics.
// Purpose: Define the seams between the orchestrator and its collaborators.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The orchestrator never inspects engine internals. An [`Engine`] compiles
//! source into an opaque unit and executes units inside a scope; the two
//! fallible steps return their errors on separate channels so parse-time and
//! run-time failures cannot be confused. A [`Corpus`] hides where case files
//! and helper scripts come from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CasePath;
use crate::core::Diagnostic;
use crate::core::EngineFailure;
use crate::core::HelperScript;
use crate::core::OptimizationTier;

// ============================================================================
// SECTION: Evaluation Engine
// ============================================================================

/// External language-evaluation engine.
///
/// Compiled units are shared across worker threads through the harness cache,
/// so they must be `Send + Sync`. Scopes are created per configuration and
/// never shared.
pub trait Engine: Send + Sync {
    /// Compiled, executable unit.
    type Unit: Send + Sync;
    /// Global scope that units execute in.
    type Scope;

    /// Creates a fresh global scope for the given tier.
    fn new_scope(&self, tier: OptimizationTier) -> Self::Scope;

    /// Compiles source text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineFailure`] when the source fails to parse or compile.
    fn compile(
        &self,
        source: &str,
        filename: &str,
        tier: OptimizationTier,
    ) -> Result<Self::Unit, EngineFailure>;

    /// Executes a compiled unit inside a scope.
    ///
    /// # Errors
    ///
    /// Returns [`EngineFailure`] when execution raises an error.
    fn execute(&self, unit: &Self::Unit, scope: &mut Self::Scope) -> Result<(), EngineFailure>;
}

// ============================================================================
// SECTION: Corpus
// ============================================================================

/// Kind of a corpus entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// Corpus access errors.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// I/O failure while reading the corpus.
    #[error("corpus io error at {path}: {message}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Requested entry does not exist.
    #[error("corpus entry not found: {0}")]
    NotFound(String),
}

/// Read-only access to case files and helper scripts.
pub trait Corpus: Send + Sync {
    /// Returns the kind of entry at a corpus-relative path, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when the entry cannot be inspected.
    fn entry_kind(&self, path: &CasePath) -> Result<Option<EntryKind>, CorpusError>;

    /// Lists every case file beneath a directory, recursively, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when the directory cannot be traversed.
    fn list_cases(&self, dir: &CasePath) -> Result<Vec<CasePath>, CorpusError>;

    /// Reads a case file.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when the file cannot be read.
    fn read_case(&self, path: &CasePath) -> Result<String, CorpusError>;

    /// Reads a helper script.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when the script cannot be read.
    fn read_helper(&self, script: &HelperScript) -> Result<String, CorpusError>;
}

/// Returns true when a file name follows the case-file naming convention.
#[must_use]
pub fn is_case_file_name(name: &str) -> bool {
    name.ends_with(".js") && !name.ends_with("_FIXTURE.js")
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Destination for non-fatal diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Records a diagnostic.
    fn record(&self, diagnostic: &Diagnostic);
}
