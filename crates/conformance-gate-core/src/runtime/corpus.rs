// conformance-gate-core/src/runtime/corpus.rs
// ============================================================================
// Module: Conformance Corpus Implementations
// Description: Filesystem and in-memory implementations of the corpus interface.
// Purpose: Discover case files and read case and helper script sources.
// Dependencies: crate::{core, interfaces}, walkdir
// ============================================================================

//! ## Overview
//! [`FsCorpus`] walks a directory tree on disk; [`InMemoryCorpus`] serves a
//! fixed set of files for tests and demos. Both list cases in sorted path
//! order so that resolution is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::core::CasePath;
use crate::core::HelperScript;
use crate::interfaces::Corpus;
use crate::interfaces::CorpusError;
use crate::interfaces::EntryKind;
use crate::interfaces::is_case_file_name;

// ============================================================================
// SECTION: Filesystem Corpus
// ============================================================================

/// Corpus backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsCorpus {
    /// Directory that case paths are relative to.
    root: PathBuf,
}

impl FsCorpus {
    /// Creates a corpus rooted at the given test directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the corpus root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a case path against the root.
    fn resolve(&self, path: &CasePath) -> PathBuf {
        if path.as_str().is_empty() { self.root.clone() } else { self.root.join(path.as_str()) }
    }
}

impl Corpus for FsCorpus {
    fn entry_kind(&self, path: &CasePath) -> Result<Option<EntryKind>, CorpusError> {
        let resolved = self.resolve(path);
        match fs::metadata(&resolved) {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(meta) if meta.is_file() => Ok(Some(EntryKind::File)),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&resolved, &err)),
        }
    }

    fn list_cases(&self, dir: &CasePath) -> Result<Vec<CasePath>, CorpusError> {
        let resolved = self.resolve(dir);
        let mut cases = Vec::new();
        for entry in WalkDir::new(&resolved).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|err| CorpusError::Io {
                path: resolved.display().to_string(),
                message: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_case_file_name(&name) {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).map_err(|_| CorpusError::Io {
                path: entry.path().display().to_string(),
                message: "case file escapes corpus root".to_string(),
            })?;
            cases.push(CasePath::from_relative(relative));
        }
        cases.sort();
        Ok(cases)
    }

    fn read_case(&self, path: &CasePath) -> Result<String, CorpusError> {
        let resolved = self.resolve(path);
        fs::read_to_string(&resolved).map_err(|err| io_error(&resolved, &err))
    }

    fn read_helper(&self, script: &HelperScript) -> Result<String, CorpusError> {
        let path = Path::new(script.as_str());
        fs::read_to_string(path).map_err(|err| io_error(path, &err))
    }
}

/// Maps an I/O error into a corpus error.
fn io_error(path: &Path, err: &io::Error) -> CorpusError {
    if err.kind() == io::ErrorKind::NotFound {
        return CorpusError::NotFound(path.display().to_string());
    }
    CorpusError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

// ============================================================================
// SECTION: In-Memory Corpus
// ============================================================================

/// In-memory corpus for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCorpus {
    /// Case files keyed by corpus-relative path.
    files: BTreeMap<CasePath, String>,
    /// Helper scripts keyed by identity.
    helpers: BTreeMap<HelperScript, String>,
}

impl InMemoryCorpus {
    /// Creates an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, returning the updated corpus.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<CasePath>, source: impl Into<String>) -> Self {
        self.insert_file(path, source);
        self
    }

    /// Adds a helper script, returning the updated corpus.
    #[must_use]
    pub fn with_helper(mut self, script: impl Into<HelperScript>, source: impl Into<String>) -> Self {
        self.insert_helper(script, source);
        self
    }

    /// Adds or replaces a file.
    pub fn insert_file(&mut self, path: impl Into<CasePath>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    /// Adds or replaces a helper script.
    pub fn insert_helper(&mut self, script: impl Into<HelperScript>, source: impl Into<String>) {
        self.helpers.insert(script.into(), source.into());
    }
}

impl Corpus for InMemoryCorpus {
    fn entry_kind(&self, path: &CasePath) -> Result<Option<EntryKind>, CorpusError> {
        if self.files.contains_key(path) {
            return Ok(Some(EntryKind::File));
        }
        if self.files.keys().any(|file| file != path && file.is_within(path)) {
            return Ok(Some(EntryKind::Directory));
        }
        Ok(None)
    }

    fn list_cases(&self, dir: &CasePath) -> Result<Vec<CasePath>, CorpusError> {
        Ok(self
            .files
            .keys()
            .filter(|file| *file != dir && file.is_within(dir))
            .filter(|file| is_case_file_name(file.file_name()))
            .cloned()
            .collect())
    }

    fn read_case(&self, path: &CasePath) -> Result<String, CorpusError> {
        self.files.get(path).cloned().ok_or_else(|| CorpusError::NotFound(path.to_string()))
    }

    fn read_helper(&self, script: &HelperScript) -> Result<String, CorpusError> {
        self.helpers.get(script).cloned().ok_or_else(|| CorpusError::NotFound(script.to_string()))
    }
}
