// conformance-gate-core/src/core/case.rs
// ============================================================================
// Module: Conformance Case Model
// Description: Case metadata decoding and the immutable case descriptor.
// Purpose: Turn the YAML front matter of a case into strongly typed fields.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Every case file carries exactly one metadata block delimited by
//! [`METADATA_START`] and [`METADATA_END`]. The block is decoded straight into
//! [`CaseMetadata`]; the loosely typed YAML document never leaves this module.
//! [`CaseDescriptor`] is the immutable result the rest of the pipeline sees.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::CasePath;
use crate::core::identifiers::HelperScript;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Opening delimiter of the metadata block.
pub const METADATA_START: &str = "/*---";
/// Closing delimiter of the metadata block.
pub const METADATA_END: &str = "---*/";
/// Negative phase value marking a parse-time (early) error.
pub const EARLY_PHASE: &str = "early";

/// Execution-mode flags recognized by the harness.
pub mod flags {
    /// Run only with the strict-mode prologue.
    pub const ONLY_STRICT: &str = "onlyStrict";
    /// Run only without the strict-mode prologue.
    pub const NO_STRICT: &str = "noStrict";
    /// Run the body verbatim: no default helpers, no strict prologue.
    pub const RAW: &str = "raw";
    /// Case is a module and needs a module host.
    pub const MODULE: &str = "module";
    /// Case needs an asynchronous host.
    pub const ASYNC: &str = "async";
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Metadata block extraction and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// The opening delimiter was not found.
    #[error("metadata block start marker `/*---` not found")]
    MissingStart,
    /// The closing delimiter was not found.
    #[error("metadata block end marker `---*/` not found")]
    MissingEnd,
    /// The opening delimiter appears after the closing delimiter.
    #[error("metadata block start marker appears after its end marker")]
    Misordered,
    /// The block contains no document.
    #[error("metadata block is empty")]
    Empty,
    /// The block is not a valid metadata document.
    #[error("metadata decode error: {0}")]
    Decode(String),
    /// A negative section does not name an error type.
    #[error("negative metadata section must declare a type")]
    MissingNegativeType,
}

// ============================================================================
// SECTION: Metadata Document
// ============================================================================

/// Decoded `negative` section of a case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegativeMetadata {
    /// Error constructor name the case must raise.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Phase in which the error must be raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// Typed view of a case metadata block. Unrecognized keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseMetadata {
    /// Helper scripts named by the case, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    /// Expected failure, when the case is negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<NegativeMetadata>,
    /// Execution-mode flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// Language features exercised by the case.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl CaseMetadata {
    /// Extracts and decodes the metadata block of a case source.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the block is missing, misordered, empty,
    /// or cannot be decoded.
    pub fn parse(source: &str) -> Result<Self, MetadataError> {
        let block = extract_block(source)?;
        if block.trim().is_empty() {
            return Err(MetadataError::Empty);
        }
        let metadata: Self =
            serde_yaml::from_str(block).map_err(|err| MetadataError::Decode(err.to_string()))?;
        if let Some(negative) = &metadata.negative
            && negative.error_type.is_none()
        {
            return Err(MetadataError::MissingNegativeType);
        }
        Ok(metadata)
    }

    /// Returns the expected error declared by the negative section.
    #[must_use]
    pub fn expected_error(&self) -> Option<ExpectedError> {
        let negative = self.negative.as_ref()?;
        let kind = negative.error_type.clone()?;
        Some(ExpectedError {
            kind,
            early: negative.phase.as_deref() == Some(EARLY_PHASE),
        })
    }

    /// Returns true when the case carries the given flag.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|value| value == flag)
    }
}

/// Returns the text between the metadata delimiters.
fn extract_block(source: &str) -> Result<&str, MetadataError> {
    let end = source.find(METADATA_END);
    let Some(start) = source.find(METADATA_START) else {
        return Err(MetadataError::MissingStart);
    };
    let Some(end) = end else {
        return Err(MetadataError::MissingEnd);
    };
    let body_start = start + METADATA_START.len();
    if body_start > end {
        return Err(MetadataError::Misordered);
    }
    source.get(body_start..end).ok_or(MetadataError::Misordered)
}

// ============================================================================
// SECTION: Case Descriptor
// ============================================================================

/// Error a negative case must raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedError {
    /// Error kind, compared against the kind extracted from the engine error.
    pub kind: String,
    /// True when the error must surface while compiling.
    pub early: bool,
}

impl ExpectedError {
    /// Returns the phase label used in reports.
    #[must_use]
    pub const fn phase_label(&self) -> &'static str {
        if self.early { "early" } else { "runtime" }
    }
}

/// Immutable, normalized description of one case file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseDescriptor {
    /// Corpus-relative path of the case.
    path: CasePath,
    /// Raw case body, metadata block included.
    source_text: String,
    /// Helper scripts evaluated before the body, in evaluation order.
    dependencies: Vec<HelperScript>,
    /// Expected failure, when the case is negative.
    expected_error: Option<ExpectedError>,
    /// Execution-mode flags.
    flags: BTreeSet<String>,
    /// Language features exercised by the case.
    features: BTreeSet<String>,
}

impl CaseDescriptor {
    /// Builds a descriptor from decoded metadata and resolved dependencies.
    #[must_use]
    pub fn new(
        path: CasePath,
        source_text: String,
        metadata: &CaseMetadata,
        dependencies: Vec<HelperScript>,
    ) -> Self {
        Self {
            path,
            source_text,
            dependencies,
            expected_error: metadata.expected_error(),
            flags: metadata.flags.iter().cloned().collect(),
            features: metadata.features.iter().cloned().collect(),
        }
    }

    /// Returns the corpus-relative path.
    #[must_use]
    pub const fn path(&self) -> &CasePath {
        &self.path
    }

    /// Returns the raw case body.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Returns the helper scripts in evaluation order.
    #[must_use]
    pub fn dependencies(&self) -> &[HelperScript] {
        &self.dependencies
    }

    /// Returns the expected failure, if any.
    #[must_use]
    pub const fn expected_error(&self) -> Option<&ExpectedError> {
        self.expected_error.as_ref()
    }

    /// Returns the expected error kind, if any.
    #[must_use]
    pub fn expected_error_kind(&self) -> Option<&str> {
        self.expected_error.as_ref().map(|expected| expected.kind.as_str())
    }

    /// Returns true when the expected error must occur at parse time.
    #[must_use]
    pub fn fails_at_parse_time(&self) -> bool {
        self.expected_error.as_ref().is_some_and(|expected| expected.early)
    }

    /// Returns true when the case expects an error.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.expected_error.is_some()
    }

    /// Returns the execution-mode flags.
    #[must_use]
    pub const fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Returns the exercised features.
    #[must_use]
    pub const fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    /// Returns true when the case carries the given flag.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}
