// conformance-gate-core/src/runtime/executor.rs
// ============================================================================
// Module: Case Executor
// Description: Runs one configuration against the engine and validates the result.
// Purpose: Build the helper scope, compile and execute the case, classify the outcome.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Helper scripts are compiled through the [`HarnessCache`] and executed into a
//! fresh scope in dependency order. The case body, with the strict prologue
//! when required, is compiled under its corpus-relative name and executed in
//! that scope. A compile failure becomes [`ActualResult::ParseError`]; an
//! execution failure becomes [`ActualResult::RuntimeError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ActualResult;
use crate::core::RunConfiguration;
use crate::core::Verdict;
use crate::interfaces::Corpus;
use crate::interfaces::Engine;
use crate::runtime::harness_cache::HarnessCache;
use crate::runtime::harness_cache::HarnessError;
use crate::runtime::validator::OutcomeValidator;

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Executes run configurations with a shared engine and helper cache.
pub struct CaseExecutor<'a, E: Engine, C: ?Sized> {
    /// Evaluation engine.
    engine: &'a E,
    /// Corpus helper scripts are read from.
    corpus: &'a C,
    /// Compiled helper scripts.
    cache: &'a HarnessCache<E::Unit>,
    /// Verdict state machine.
    validator: OutcomeValidator<'a>,
}

impl<'a, E: Engine, C: Corpus + ?Sized> CaseExecutor<'a, E, C> {
    /// Creates an executor.
    #[must_use]
    pub const fn new(
        engine: &'a E,
        corpus: &'a C,
        cache: &'a HarnessCache<E::Unit>,
        validator: OutcomeValidator<'a>,
    ) -> Self {
        Self {
            engine,
            corpus,
            cache,
            validator,
        }
    }

    /// Runs one configuration and classifies its result.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when a helper script cannot be read, compiled,
    /// or executed. Helper failures are never attributed to the case itself.
    pub fn run(&self, config: &RunConfiguration) -> Result<Verdict, HarnessError> {
        let result = self.execute(config)?;
        Ok(self.validator.validate(config, &result))
    }

    /// Runs one configuration and returns the raw engine result.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the helper scope cannot be built.
    pub fn execute(&self, config: &RunConfiguration) -> Result<ActualResult, HarnessError> {
        let mut scope = self.build_scope(config)?;
        let source = config.prepared_source();
        let unit = match self.engine.compile(&source, config.path().as_str(), config.tier()) {
            Ok(unit) => unit,
            Err(failure) => return Ok(ActualResult::ParseError(failure)),
        };
        match self.engine.execute(&unit, &mut scope) {
            Ok(()) => Ok(ActualResult::Completed),
            Err(failure) => Ok(ActualResult::RuntimeError(failure)),
        }
    }

    /// Creates a scope with every helper script of the case executed into it.
    fn build_scope(&self, config: &RunConfiguration) -> Result<E::Scope, HarnessError> {
        let tier = config.tier();
        let mut scope = self.engine.new_scope(tier);
        for script in config.case().dependencies() {
            let unit = self.cache.get_or_compile(tier, script, || {
                let source = self.corpus.read_helper(script).map_err(|source| {
                    HarnessError::Read {
                        script: script.clone(),
                        source,
                    }
                })?;
                self.engine.compile(&source, script.as_str(), tier).map_err(|failure| {
                    HarnessError::Compile {
                        script: script.clone(),
                        failure,
                    }
                })
            })?;
            self.engine.execute(&unit, &mut scope).map_err(|failure| HarnessError::Execute {
                script: script.clone(),
                failure,
            })?;
        }
        Ok(scope)
    }
}
