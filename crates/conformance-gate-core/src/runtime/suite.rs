// conformance-gate-core/src/runtime/suite.rs
// ============================================================================
// Module: Suite Planning and Execution
// Description: Resolves, loads, and expands a corpus, then runs the plan in parallel.
// Purpose: Tie the resolver, loader, expander, executor, and tally into one run.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`plan_suite`] does all the work that must fail fast: directive resolution
//! and metadata decoding errors abort the plan. [`SuiteRunner`] then executes
//! every configuration on a fixed pool of worker threads. Per-configuration
//! failures, engine panics included, are isolated and collected into a
//! [`SuiteReport`]; stale exclusions are reported once all workers are done.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use serde::Serialize;
use thiserror::Error;

use crate::core::CasePath;
use crate::core::Diagnostic;
use crate::core::MetadataError;
use crate::core::OptimizationTier;
use crate::core::RunConfiguration;
use crate::core::StrictMode;
use crate::core::Verdict;
use crate::core::VerdictKind;
use crate::interfaces::Corpus;
use crate::interfaces::CorpusError;
use crate::interfaces::DiagnosticSink;
use crate::interfaces::Engine;
use crate::runtime::exclusions::ConfigError;
use crate::runtime::exclusions::ExclusionConfig;
use crate::runtime::exclusions::ExclusionResolver;
use crate::runtime::executor::CaseExecutor;
use crate::runtime::expander::SkipReason;
use crate::runtime::expander::VariantExpander;
use crate::runtime::harness_cache::HarnessCache;
use crate::runtime::loader::CaseLoader;
use crate::runtime::loader::HarnessLayout;
use crate::runtime::tally::ExclusionTally;
use crate::runtime::validator::OutcomeValidator;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort test collection.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The directive list is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A selected case has an invalid metadata block.
    #[error("error while parsing metadata of {path}: {source}")]
    Metadata {
        /// Case path.
        path: CasePath,
        /// Decoding error.
        source: MetadataError,
    },
    /// A selected case could not be read.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

// ============================================================================
// SECTION: Planning
// ============================================================================

/// Inputs for [`plan_suite`].
#[derive(Clone, Copy)]
pub struct PlanRequest<'a> {
    /// Directive list text.
    pub directives: &'a str,
    /// Helper script layout.
    pub layout: &'a HarnessLayout,
    /// Variant expander with tiers and skip policy.
    pub expander: &'a VariantExpander,
    /// Optional substring a case path must contain to be planned.
    pub filter: Option<&'a str>,
    /// Corpus location also tried when matching exclusion suffixes.
    pub match_prefix: Option<&'a str>,
}

/// Selected case that produced no configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCase {
    /// Case path.
    pub path: CasePath,
    /// Skip reason.
    pub reason: SkipReason,
}

/// Fully expanded run plan.
#[derive(Debug)]
pub struct SuitePlan {
    /// Resolved selection and exclusion sets.
    exclusions: ExclusionConfig,
    /// Configurations in planning order.
    configurations: Vec<RunConfiguration>,
    /// Cases skipped by policy.
    skipped: Vec<SkippedCase>,
    /// Number of case files loaded.
    loaded: usize,
    /// Expected-failure tally for soft-excluded files.
    tally: ExclusionTally,
    /// Tiers the plan was expanded with.
    tiers: Vec<OptimizationTier>,
}

impl SuitePlan {
    /// Returns the resolved exclusion sets.
    #[must_use]
    pub const fn exclusions(&self) -> &ExclusionConfig {
        &self.exclusions
    }

    /// Returns the run configurations.
    #[must_use]
    pub fn configurations(&self) -> &[RunConfiguration] {
        &self.configurations
    }

    /// Returns the skipped cases.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedCase] {
        &self.skipped
    }

    /// Returns the number of loaded case files.
    #[must_use]
    pub const fn loaded(&self) -> usize {
        self.loaded
    }

    /// Returns the expected-failure tally.
    #[must_use]
    pub const fn tally(&self) -> &ExclusionTally {
        &self.tally
    }

    /// Returns the tiers the plan was expanded with.
    #[must_use]
    pub fn tiers(&self) -> &[OptimizationTier] {
        &self.tiers
    }
}

/// Resolves directives, loads every selected case, and expands it.
///
/// # Errors
///
/// Returns [`PlanError`] when directives are invalid or a selected case
/// cannot be read or decoded.
pub fn plan_suite<C: Corpus + ?Sized>(
    corpus: &C,
    request: PlanRequest<'_>,
    diagnostics: &dyn DiagnosticSink,
) -> Result<SuitePlan, PlanError> {
    let exclusions = ExclusionResolver::new(corpus, diagnostics)
        .with_match_prefix(request.match_prefix)
        .resolve(request.directives)?;
    let loader = CaseLoader::new(corpus, request.layout, diagnostics);
    let mut tally = ExclusionTally::new();
    let mut configurations = Vec::new();
    let mut skipped = Vec::new();
    let mut loaded = 0;

    for path in exclusions.selected() {
        if let Some(filter) = request.filter
            && !path.as_str().contains(filter)
        {
            continue;
        }
        let case = Arc::new(loader.load(path)?);
        loaded += 1;
        if let Some(reason) = request.expander.skip_reason(&case) {
            diagnostics.record(&Diagnostic::CaseSkipped {
                path: path.clone(),
                reason: reason.to_string(),
            });
            skipped.push(SkippedCase {
                path: path.clone(),
                reason,
            });
            continue;
        }
        let soft = exclusions.is_soft_excluded(path);
        configurations.extend(request.expander.expand(&case, soft, &mut tally));
    }

    Ok(SuitePlan {
        exclusions,
        configurations,
        skipped,
        loaded,
        tally,
        tiers: request.expander.tiers().to_vec(),
    })
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Outcome of one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The configuration reached a verdict.
    Verdict {
        /// Verdict reached.
        verdict: Verdict,
    },
    /// Helper scripts could not be loaded into the scope.
    HarnessFailure {
        /// Failure report.
        reason: String,
    },
}

impl RunOutcome {
    /// Returns true when the outcome must be reported as a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        match self {
            Self::Verdict {
                verdict,
            } => verdict.is_failure(),
            Self::HarnessFailure {
                ..
            } => true,
        }
    }

    /// Returns the failure report, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Verdict {
                verdict,
            } => verdict.reason(),
            Self::HarnessFailure {
                reason,
            } => Some(reason),
        }
    }
}

/// Result of one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationResult {
    /// Case path.
    pub path: CasePath,
    /// Optimization tier.
    pub tier: OptimizationTier,
    /// Strict-mode variant.
    pub strict: StrictMode,
    /// Outcome reached.
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl ConfigurationResult {
    /// Returns the display name of the configuration.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} [tier={}, {}]", self.path, self.tier, self.strict.as_str())
    }
}

/// Aggregated results of a suite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// Per-configuration results in plan order.
    pub results: Vec<ConfigurationResult>,
    /// Soft-excluded files that passed in every configuration.
    pub stale_exclusions: Vec<CasePath>,
}

impl SuiteReport {
    /// Returns the results that must be reported as failures.
    pub fn failures(&self) -> impl Iterator<Item = &ConfigurationResult> {
        self.results.iter().filter(|result| result.outcome.is_failure())
    }

    /// Returns true when no configuration failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Returns the number of results per verdict kind.
    #[must_use]
    pub fn verdict_counts(&self) -> BTreeMap<VerdictKind, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            if let RunOutcome::Verdict {
                verdict,
            } = &result.outcome
            {
                *counts.entry(verdict.kind()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Returns the number of harness failures.
    #[must_use]
    pub fn harness_failures(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result.outcome, RunOutcome::HarnessFailure { .. }))
            .count()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes a plan on a pool of worker threads.
#[derive(Debug, Clone, Copy)]
pub struct SuiteRunner {
    /// Number of worker threads.
    workers: NonZeroUsize,
}

impl SuiteRunner {
    /// Creates a runner; zero workers selects the available parallelism.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = NonZeroUsize::new(workers)
            .or_else(|| thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            workers,
        }
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Runs every configuration of the plan and reports stale exclusions.
    pub fn run<E: Engine, C: Corpus + ?Sized>(
        &self,
        plan: &SuitePlan,
        engine: &E,
        corpus: &C,
        diagnostics: &dyn DiagnosticSink,
    ) -> SuiteReport {
        let cache = HarnessCache::new(plan.tiers());
        let executor =
            CaseExecutor::new(engine, corpus, &cache, OutcomeValidator::new(plan.tally()));
        let configurations = plan.configurations();
        let cursor = AtomicUsize::new(0);
        let worker_count = self.workers.get().min(configurations.len().max(1));

        let mut outcomes: Vec<Option<RunOutcome>> = vec![None; configurations.len()];
        thread::scope(|scope| {
            let handles: Vec<_> = (0 .. worker_count)
                .map(|_| {
                    scope.spawn(|| {
                        let mut produced = Vec::new();
                        loop {
                            let index = cursor.fetch_add(1, Ordering::Relaxed);
                            let Some(config) = configurations.get(index) else {
                                break;
                            };
                            let outcome =
                                panic::catch_unwind(AssertUnwindSafe(|| run_one(&executor, config)))
                                    .unwrap_or_else(|_| RunOutcome::HarnessFailure {
                                        reason: "engine panicked while running the configuration"
                                            .to_string(),
                                    });
                            produced.push((index, outcome));
                        }
                        produced
                    })
                })
                .collect();
            for handle in handles {
                if let Ok(produced) = handle.join() {
                    for (index, outcome) in produced {
                        if let Some(slot) = outcomes.get_mut(index) {
                            *slot = Some(outcome);
                        }
                    }
                }
            }
        });

        let results = configurations
            .iter()
            .zip(outcomes)
            .map(|(config, outcome)| ConfigurationResult {
                path: config.path().clone(),
                tier: config.tier(),
                strict: config.strict(),
                outcome: outcome.unwrap_or_else(|| RunOutcome::HarnessFailure {
                    reason: "worker thread panicked before reporting a result".to_string(),
                }),
            })
            .collect();

        let stale_exclusions = plan.tally().stale_exclusions();
        for path in &stale_exclusions {
            diagnostics.record(&Diagnostic::StaleExclusion {
                path: path.clone(),
            });
        }
        SuiteReport {
            results,
            stale_exclusions,
        }
    }
}

/// Runs one configuration, converting harness errors into outcomes.
fn run_one<E: Engine, C: Corpus + ?Sized>(
    executor: &CaseExecutor<'_, E, C>,
    config: &RunConfiguration,
) -> RunOutcome {
    match executor.run(config) {
        Ok(verdict) => RunOutcome::Verdict {
            verdict,
        },
        Err(err) => RunOutcome::HarnessFailure {
            reason: format!("Failed to build a scope with the harness files: {err}"),
        },
    }
}
