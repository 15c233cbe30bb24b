// conformance-gate-core/src/runtime/tally.rs
// ============================================================================
// Module: Exclusion Tally
// Description: Per-file counters of expected failures for soft-excluded cases.
// Purpose: Detect soft exclusions that no longer exclude any failure.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Planning registers one expected failure per configuration generated for a
//! soft-excluded file; this needs `&mut self` and happens on a single thread.
//! During execution the map is frozen and only the per-entry atomic counters
//! change, so workers share the tally by reference without locking.
//!
//! An entry whose remaining count reaches zero passed in every configuration:
//! its exclusion is stale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::core::CasePath;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Counters for one soft-excluded file.
#[derive(Debug, Default)]
struct TallyEntry {
    /// Configurations generated for the file.
    generated: usize,
    /// Configurations not yet observed passing.
    remaining: AtomicUsize,
}

/// Expected-failure counters keyed by case file.
#[derive(Debug, Default)]
pub struct ExclusionTally {
    /// Entries keyed by case path; frozen once execution starts.
    entries: BTreeMap<CasePath, TallyEntry>,
}

impl ExclusionTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one generated configuration of a soft-excluded file.
    pub fn record_generated(&mut self, path: &CasePath) {
        let entry = self.entries.entry(path.clone()).or_default();
        entry.generated += 1;
        *entry.remaining.get_mut() += 1;
    }

    /// Records that a configuration of a soft-excluded file passed.
    ///
    /// Returns true when the entry was decremented. Unknown files and entries
    /// already at zero are left untouched.
    pub fn record_pass(&self, path: &CasePath) -> bool {
        let Some(entry) = self.entries.get(path) else {
            return false;
        };
        entry
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| value.checked_sub(1))
            .is_ok()
    }

    /// Returns the number of configurations generated for a file.
    #[must_use]
    pub fn generated(&self, path: &CasePath) -> Option<usize> {
        self.entries.get(path).map(|entry| entry.generated)
    }

    /// Returns the number of configurations not yet observed passing.
    #[must_use]
    pub fn remaining(&self, path: &CasePath) -> Option<usize> {
        self.entries.get(path).map(|entry| entry.remaining.load(Ordering::Acquire))
    }

    /// Returns the number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no file is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns files that passed in every generated configuration.
    #[must_use]
    pub fn stale_exclusions(&self) -> Vec<CasePath> {
        self.entries
            .iter()
            .filter(|(_, entry)| {
                entry.generated > 0 && entry.remaining.load(Ordering::Acquire) == 0
            })
            .map(|(path, _)| path.clone())
            .collect()
    }
}
