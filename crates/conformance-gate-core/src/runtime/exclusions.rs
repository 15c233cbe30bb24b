// conformance-gate-core/src/runtime/exclusions.rs
// ============================================================================
// Module: Exclusion Resolver
// Description: Parses selection/exclusion directives and resolves them against a corpus.
// Purpose: Decide which case files run and which are expected to fail.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The directive list is line oriented. A bare path selects a file or, for a
//! directory, every case file beneath it. The lines directly after a directory
//! may exclude files of that directory by path suffix: `!suffix` marks them as
//! expected to fail, `!!suffix` removes them from the run entirely.
//!
//! The parser has two states. In [`ParserState::TopLevel`] every directive
//! must name an existing path. In [`ParserState::InExclusionBlock`] exclusion
//! lines are matched against the files discovered for the open directory; the
//! first other directive closes the block and is pushed back to be processed
//! again at the top level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::CasePath;
use crate::core::Diagnostic;
use crate::interfaces::Corpus;
use crate::interfaces::CorpusError;
use crate::interfaces::DiagnosticSink;
use crate::interfaces::EntryKind;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Directive resolution errors. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A directive names a path that does not exist in the corpus.
    #[error("path '{directive}' declared at line #{line} doesn't exist")]
    MissingPath {
        /// 1-based line number.
        line: usize,
        /// Directive text.
        directive: String,
    },
    /// An exclusion appears outside a directory block.
    #[error("unexpected exclusion '{directive}' at line #{line}")]
    OrphanExclusion {
        /// 1-based line number.
        line: usize,
        /// Directive text.
        directive: String,
    },
    /// An exclusion line has no suffix.
    #[error("empty exclusion at line #{line}")]
    EmptyExclusion {
        /// 1-based line number.
        line: usize,
    },
    /// A directive path is absolute or climbs out of the corpus.
    #[error("path '{directive}' declared at line #{line} must stay inside the corpus")]
    InvalidPath {
        /// 1-based line number.
        line: usize,
        /// Directive text.
        directive: String,
    },
    /// The corpus could not be inspected.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

// ============================================================================
// SECTION: Resolution Result
// ============================================================================

/// Files selected for a run and their exclusion state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionConfig {
    /// Files to run, in discovery order, without hard-excluded files.
    selected: Vec<CasePath>,
    /// Files expected to fail.
    soft_excluded: BTreeSet<CasePath>,
    /// Files never compiled or executed.
    hard_excluded: BTreeSet<CasePath>,
}

impl ExclusionConfig {
    /// Returns the files to run, in discovery order.
    #[must_use]
    pub fn selected(&self) -> &[CasePath] {
        &self.selected
    }

    /// Returns the files expected to fail.
    #[must_use]
    pub const fn soft_excluded(&self) -> &BTreeSet<CasePath> {
        &self.soft_excluded
    }

    /// Returns the files that never run.
    #[must_use]
    pub const fn hard_excluded(&self) -> &BTreeSet<CasePath> {
        &self.hard_excluded
    }

    /// Returns true when the file is soft-excluded.
    #[must_use]
    pub fn is_soft_excluded(&self, path: &CasePath) -> bool {
        self.soft_excluded.contains(path)
    }

    /// Returns true when the file is hard-excluded.
    #[must_use]
    pub fn is_hard_excluded(&self, path: &CasePath) -> bool {
        self.hard_excluded.contains(path)
    }
}

// ============================================================================
// SECTION: Directive Grammar
// ============================================================================

/// One meaningful directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive<'t> {
    /// Select a file or directory.
    Include(&'t str),
    /// Mark matching files as expected to fail.
    Soft(&'t str),
    /// Drop matching files from the run.
    Hard(&'t str),
}

impl<'t> Directive<'t> {
    /// Classifies a trimmed line; blank lines and comments yield `None`.
    fn parse(line: &'t str) -> Option<Self> {
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        if let Some(rest) = line.strip_prefix("!!") {
            return Some(Self::Hard(rest.trim_start()));
        }
        if let Some(rest) = line.strip_prefix('!') {
            return Some(Self::Soft(rest.trim_start()));
        }
        Some(Self::Include(line))
    }
}

/// Parser state.
#[derive(Debug)]
enum ParserState {
    /// Expecting file or directory directives.
    TopLevel,
    /// Consuming exclusions for the most recent directory.
    InExclusionBlock {
        /// Files discovered under the open directory.
        files: Vec<CasePath>,
    },
}

/// Accumulates the resolution result.
#[derive(Debug, Default)]
struct Accumulator {
    /// Included files in discovery order.
    included: Vec<CasePath>,
    /// Deduplication set for `included`.
    seen: BTreeSet<CasePath>,
    /// Soft-excluded files.
    soft: BTreeSet<CasePath>,
    /// Hard-excluded files.
    hard: BTreeSet<CasePath>,
}

impl Accumulator {
    /// Appends files, skipping ones already included.
    fn include(&mut self, files: impl IntoIterator<Item = CasePath>) {
        for file in files {
            if self.seen.insert(file.clone()) {
                self.included.push(file);
            }
        }
    }

    /// Produces the final configuration.
    fn finish(self) -> ExclusionConfig {
        let hard = self.hard;
        let selected = self.included.into_iter().filter(|file| !hard.contains(file)).collect();
        ExclusionConfig {
            selected,
            soft_excluded: self.soft,
            hard_excluded: hard,
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves directive text against a corpus.
pub struct ExclusionResolver<'a, C: ?Sized> {
    /// Corpus the directives refer to.
    corpus: &'a C,
    /// Destination for unmatched-exclusion warnings.
    diagnostics: &'a dyn DiagnosticSink,
    /// Location of the corpus, also tried when matching exclusion suffixes.
    match_prefix: Option<&'a str>,
}

impl<'a, C: Corpus + ?Sized> ExclusionResolver<'a, C> {
    /// Creates a resolver.
    #[must_use]
    pub const fn new(corpus: &'a C, diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self {
            corpus,
            diagnostics,
            match_prefix: None,
        }
    }

    /// Also matches exclusion suffixes against `<prefix>/<path>`, so a suffix
    /// may spell out the corpus location, e.g. `!test/built-ins/x.js`.
    #[must_use]
    pub const fn with_match_prefix(mut self, prefix: Option<&'a str>) -> Self {
        self.match_prefix = prefix;
        self
    }

    /// Resolves the directive text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a directive names a missing or invalid
    /// path, when an exclusion appears outside a directory block, or when the
    /// corpus cannot be read.
    pub fn resolve(&self, config_text: &str) -> Result<ExclusionConfig, ConfigError> {
        let mut lines = config_text.lines().enumerate().map(|(index, line)| (index + 1, line.trim()));
        let mut pushback: Option<(usize, &str)> = None;
        let mut state = ParserState::TopLevel;
        let mut acc = Accumulator::default();

        while let Some((line_no, line)) = pushback.take().or_else(|| lines.next()) {
            let Some(directive) = Directive::parse(line) else {
                continue;
            };
            state = match (state, directive) {
                (ParserState::TopLevel, Directive::Include(path)) => {
                    self.open(line_no, path, &mut acc)?
                }
                (ParserState::TopLevel, Directive::Soft(_) | Directive::Hard(_)) => {
                    return Err(ConfigError::OrphanExclusion {
                        line: line_no,
                        directive: line.to_string(),
                    });
                }
                (
                    ParserState::InExclusionBlock {
                        files,
                    },
                    Directive::Soft(suffix) | Directive::Hard(suffix),
                ) => {
                    let hard = matches!(directive, Directive::Hard(_));
                    self.exclude(line_no, line, suffix, hard, &files, &mut acc)?;
                    ParserState::InExclusionBlock {
                        files,
                    }
                }
                (
                    ParserState::InExclusionBlock {
                        files,
                    },
                    Directive::Include(_),
                ) => {
                    acc.include(files);
                    pushback = Some((line_no, line));
                    ParserState::TopLevel
                }
            };
        }
        if let ParserState::InExclusionBlock {
            files,
        } = state
        {
            acc.include(files);
        }
        Ok(acc.finish())
    }

    /// Handles a top-level path directive.
    fn open(
        &self,
        line_no: usize,
        raw: &str,
        acc: &mut Accumulator,
    ) -> Result<ParserState, ConfigError> {
        if raw.starts_with('/') || raw.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(ConfigError::InvalidPath {
                line: line_no,
                directive: raw.to_string(),
            });
        }
        let path = CasePath::new(raw);
        match self.corpus.entry_kind(&path)? {
            Some(EntryKind::File) => {
                acc.include([path]);
                Ok(ParserState::TopLevel)
            }
            Some(EntryKind::Directory) => Ok(ParserState::InExclusionBlock {
                files: self.corpus.list_cases(&path)?,
            }),
            None => Err(ConfigError::MissingPath {
                line: line_no,
                directive: raw.to_string(),
            }),
        }
    }

    /// Returns true when `suffix` ends the corpus path, optionally prefixed.
    fn matches(&self, file: &CasePath, suffix: &str) -> bool {
        if file.ends_with(suffix) {
            return true;
        }
        self.match_prefix.is_some_and(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            !prefix.is_empty() && format!("{prefix}/{file}").ends_with(suffix)
        })
    }

    /// Applies one exclusion line to the files of the open directory.
    fn exclude(
        &self,
        line_no: usize,
        raw: &str,
        suffix: &str,
        hard: bool,
        files: &[CasePath],
        acc: &mut Accumulator,
    ) -> Result<(), ConfigError> {
        if suffix.is_empty() {
            return Err(ConfigError::EmptyExclusion {
                line: line_no,
            });
        }
        let mut matched = false;
        for file in files.iter().filter(|file| self.matches(file, suffix)) {
            matched = true;
            if hard {
                acc.hard.insert(file.clone());
            } else {
                acc.soft.insert(file.clone());
            }
        }
        if !matched {
            self.diagnostics.record(&Diagnostic::UnmatchedExclusion {
                line: line_no,
                directive: raw.to_string(),
            });
        }
        Ok(())
    }
}
