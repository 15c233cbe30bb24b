// conformance-gate-core/src/runtime/harness_cache.rs
// ============================================================================
// Module: Harness Script Cache
// Description: Populate-once cache of compiled helper scripts per tier.
// Purpose: Compile each helper script once per tier and share it across workers.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The cache is partitioned by optimization tier; the partition map is fixed
//! at construction so tiers never contend with each other. Within a partition
//! every helper script has its own slot. The first worker to need a script
//! compiles it while holding the slot lock; later workers wait for that slot
//! only and then reuse the compiled unit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::EngineFailure;
use crate::core::HelperScript;
use crate::core::OptimizationTier;
use crate::interfaces::CorpusError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while building the helper-script scope of a configuration.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Helper script could not be read.
    #[error("failed to read helper script {script}: {source}")]
    Read {
        /// Helper script identity.
        script: HelperScript,
        /// Underlying corpus error.
        source: CorpusError,
    },
    /// Helper script failed to compile.
    #[error("failed to compile helper script {script}: {failure}")]
    Compile {
        /// Helper script identity.
        script: HelperScript,
        /// Engine failure.
        failure: EngineFailure,
    },
    /// Helper script raised an error while executing.
    #[error("failed to execute helper script {script}: {failure}")]
    Execute {
        /// Helper script identity.
        script: HelperScript,
        /// Engine failure.
        failure: EngineFailure,
    },
    /// No cache partition exists for the tier.
    #[error("no harness cache partition for tier {0}")]
    UnknownTier(OptimizationTier),
    /// A cache lock was poisoned by a panicking worker.
    #[error("harness cache lock poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Slot holding one compiled helper script.
type Slot<U> = Arc<Mutex<Option<Arc<U>>>>;

/// Compiled helper scripts keyed by tier, then by script identity.
#[derive(Debug)]
pub struct HarnessCache<U> {
    /// One partition per configured tier.
    partitions: BTreeMap<OptimizationTier, Mutex<BTreeMap<HelperScript, Slot<U>>>>,
}

impl<U> HarnessCache<U> {
    /// Creates an empty cache with one partition per tier.
    #[must_use]
    pub fn new(tiers: &[OptimizationTier]) -> Self {
        Self {
            partitions: tiers.iter().map(|tier| (*tier, Mutex::new(BTreeMap::new()))).collect(),
        }
    }

    /// Returns the compiled script, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the tier has no partition, a lock is
    /// poisoned, or `compile` fails. Failed compilations are not cached.
    pub fn get_or_compile<F>(
        &self,
        tier: OptimizationTier,
        script: &HelperScript,
        compile: F,
    ) -> Result<Arc<U>, HarnessError>
    where
        F: FnOnce() -> Result<U, HarnessError>,
    {
        let partition = self.partitions.get(&tier).ok_or(HarnessError::UnknownTier(tier))?;
        let slot = {
            let mut slots = partition.lock().map_err(|_| HarnessError::Poisoned)?;
            Arc::clone(slots.entry(script.clone()).or_default())
        };
        let mut guard = slot.lock().map_err(|_| HarnessError::Poisoned)?;
        if let Some(unit) = guard.as_ref() {
            return Ok(Arc::clone(unit));
        }
        let unit = Arc::new(compile()?);
        *guard = Some(Arc::clone(&unit));
        Ok(unit)
    }

    /// Returns the number of cached scripts for a tier.
    #[must_use]
    pub fn cached(&self, tier: OptimizationTier) -> usize {
        self.partitions.get(&tier).and_then(|partition| partition.lock().ok()).map_or(0, |slots| {
            slots
                .values()
                .filter(|slot| slot.lock().is_ok_and(|unit| unit.is_some()))
                .count()
        })
    }
}
