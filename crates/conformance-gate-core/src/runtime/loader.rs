// conformance-gate-core/src/runtime/loader.rs
// ============================================================================
// Module: Case Loader
// Description: Builds case descriptors from case files and the harness layout.
// Purpose: Resolve includes into helper scripts and normalize case metadata.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The loader reads a case file, decodes its metadata block, and computes the
//! ordered list of helper scripts evaluated before the body. Unless the case is
//! `raw`, the default helpers come first, followed by the declared includes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::CaseDescriptor;
use crate::core::CasePath;
use crate::core::Diagnostic;
use crate::core::HelperScript;
use crate::core::MetadataError;
use crate::core::case::CaseMetadata;
use crate::core::flags;
use crate::interfaces::Corpus;
use crate::interfaces::DiagnosticSink;
use crate::runtime::suite::PlanError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default assertion library loaded before every non-raw case.
pub const ASSERT_HELPER: &str = "assert.js";
/// Default baseline-setup helper loaded before every non-raw case.
pub const STA_HELPER: &str = "sta.js";

// ============================================================================
// SECTION: Harness Layout
// ============================================================================

/// Location of helper scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessLayout {
    /// Directory that include names are resolved against.
    harness_dir: String,
    /// Helpers prepended to every non-raw case, in evaluation order.
    default_helpers: Vec<HelperScript>,
}

impl HarnessLayout {
    /// Creates a layout for a harness directory.
    ///
    /// `sta_override` replaces the upstream baseline-setup helper, which may
    /// use syntax the engine under test cannot parse.
    #[must_use]
    pub fn new(harness_dir: impl Into<String>, sta_override: Option<String>) -> Self {
        let harness_dir = harness_dir.into().replace('\\', "/");
        let harness_dir = harness_dir.trim_end_matches('/').to_string();
        let assert = HelperScript::new(join(&harness_dir, ASSERT_HELPER));
        let sta = sta_override
            .map_or_else(|| HelperScript::new(join(&harness_dir, STA_HELPER)), HelperScript::new);
        Self {
            harness_dir,
            default_helpers: vec![assert, sta],
        }
    }

    /// Returns the harness directory.
    #[must_use]
    pub fn harness_dir(&self) -> &str {
        &self.harness_dir
    }

    /// Returns the default helpers in evaluation order.
    #[must_use]
    pub fn default_helpers(&self) -> &[HelperScript] {
        &self.default_helpers
    }

    /// Maps an include name to its helper script.
    #[must_use]
    pub fn include(&self, name: &str) -> HelperScript {
        HelperScript::new(join(&self.harness_dir, name))
    }
}

/// Joins a directory and a file name with a forward slash.
fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() { name.to_string() } else { format!("{dir}/{name}") }
}

// ============================================================================
// SECTION: Case Loader
// ============================================================================

/// Loads case files into descriptors.
pub struct CaseLoader<'a, C: ?Sized> {
    /// Corpus the case files are read from.
    corpus: &'a C,
    /// Helper script layout.
    layout: &'a HarnessLayout,
    /// Destination for non-fatal diagnostics.
    diagnostics: &'a dyn DiagnosticSink,
}

impl<'a, C: Corpus + ?Sized> CaseLoader<'a, C> {
    /// Creates a loader.
    #[must_use]
    pub const fn new(
        corpus: &'a C,
        layout: &'a HarnessLayout,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            corpus,
            layout,
            diagnostics,
        }
    }

    /// Reads and loads one case file.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Corpus`] when the file cannot be read and
    /// [`PlanError::Metadata`] when its metadata block is invalid.
    pub fn load(&self, path: &CasePath) -> Result<CaseDescriptor, PlanError> {
        let source = self.corpus.read_case(path)?;
        self.load_source(path.clone(), source).map_err(|source| PlanError::Metadata {
            path: path.clone(),
            source,
        })
    }

    /// Builds a descriptor from already-read case source.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the metadata block is invalid.
    pub fn load_source(
        &self,
        path: CasePath,
        source: String,
    ) -> Result<CaseDescriptor, MetadataError> {
        let metadata = CaseMetadata::parse(&source)?;
        let dependencies = self.dependencies(&path, &metadata);
        Ok(CaseDescriptor::new(path, source, &metadata, dependencies))
    }

    /// Computes the helper scripts of a case, in evaluation order.
    fn dependencies(&self, path: &CasePath, metadata: &CaseMetadata) -> Vec<HelperScript> {
        let mut ordered = Vec::new();
        let mut seen = BTreeSet::new();
        if metadata.has_flag(flags::RAW) {
            if !metadata.includes.is_empty() {
                self.diagnostics.record(&Diagnostic::RawCaseWithIncludes {
                    path: path.clone(),
                });
            }
        } else {
            for helper in self.layout.default_helpers() {
                if seen.insert(helper.clone()) {
                    ordered.push(helper.clone());
                }
            }
        }
        for name in &metadata.includes {
            let helper = self.layout.include(name);
            if seen.insert(helper.clone()) {
                ordered.push(helper);
            }
        }
        ordered
    }
}
