// conformance-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Conformance Gate Identifiers
// Description: Canonical identifiers for case files, helper scripts, and tiers.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Case files are identified by their corpus-relative path written with forward
//! slashes, so exclusion suffixes match the same way on every platform. Helper
//! scripts are identified by the path they are read from. Optimization tiers
//! are the integer levels handed to the evaluation engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Case Paths
// ============================================================================

/// Corpus-relative path of a case file or directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CasePath(String);

impl CasePath {
    /// Creates a case path, normalizing separators and surrounding slashes.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let raw: String = path.into();
        let normalized = raw.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./").trim_matches('/');
        Self(trimmed.to_string())
    }

    /// Builds a case path from a filesystem path relative to the corpus root.
    #[must_use]
    pub fn from_relative(path: &Path) -> Self {
        let joined = path
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this path ends with the given suffix.
    #[must_use]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    /// Returns true when this path equals `dir` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, dir: &Self) -> bool {
        if dir.0.is_empty() {
            return true;
        }
        self.0 == dir.0
            || (self.0.starts_with(dir.0.as_str())
                && self.0.as_bytes().get(dir.0.len()) == Some(&b'/'))
    }

    /// Returns the final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for CasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CasePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CasePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Helper Scripts
// ============================================================================

/// Identity of a helper script evaluated before a case body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HelperScript(String);

impl HelperScript {
    /// Creates a helper script identity from its source path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HelperScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for HelperScript {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Optimization Tiers
// ============================================================================

/// Optimization tier handed to the evaluation engine.
///
/// `-1` selects the interpreter; non-negative values select compiled tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptimizationTier(i32);

impl OptimizationTier {
    /// Interpreted execution.
    pub const INTERPRETED: Self = Self(-1);
    /// Compiled execution without optimizations.
    pub const COMPILED: Self = Self(0);
    /// Compiled execution with every optimization enabled.
    pub const OPTIMIZED: Self = Self(9);

    /// Creates a tier from its numeric level.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    /// Returns the numeric level.
    #[must_use]
    pub const fn level(self) -> i32 {
        self.0
    }

    /// Returns the default tier matrix.
    #[must_use]
    pub const fn default_matrix() -> [Self; 3] {
        [Self::INTERPRETED, Self::COMPILED, Self::OPTIMIZED]
    }
}

impl fmt::Display for OptimizationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OptimizationTier {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i32>().map(Self)
    }
}
