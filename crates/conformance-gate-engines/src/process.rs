// conformance-gate-engines/src/process.rs
// ============================================================================
// Module: Process Engine
// Description: Engine adapter that drives an external evaluator command.
// Purpose: Run compile checks and executions as child processes.
// Dependencies: conformance-gate-core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`ProcessEngine`] maps the two engine channels onto two invocations of the
//! same command. `compile` runs the command with `check_args` and the source
//! on stdin; a non-zero exit is a parse failure. `execute` runs the command
//! with `run_args` and the scope prelude followed by the unit on stdin; a
//! unit that opens with the strict prologue has it moved to the head of the
//! program. A non-zero exit is a runtime failure. The first non-empty stderr line is the
//! failure details and the remaining lines are the trace.
//!
//! Scopes are plain text: every unit executed successfully is appended to the
//! prelude of its scope, so helper scripts are replayed before the case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::thread;

use conformance_gate_core::Engine;
use conformance_gate_core::EngineFailure;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::variant::STRICT_PROLOGUE;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable carrying the optimization tier to the child.
pub const TIER_ENV_VAR: &str = "CONFORMANCE_GATE_TIER";
/// Environment variable carrying the unit filename to the child.
pub const FILENAME_ENV_VAR: &str = "CONFORMANCE_GATE_FILENAME";
/// Maximum number of arguments per invocation list.
const MAX_ARGS: usize = 64;
/// Maximum number of extra environment variables.
const MAX_ENV_VARS: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Process engine configuration and spawn errors.
#[derive(Debug, Error)]
pub enum ProcessEngineError {
    /// The configuration is invalid.
    #[error("invalid process engine config: {0}")]
    Invalid(String),
    /// The command could not be started.
    #[error("failed to spawn engine command {command}: {message}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Underlying error message.
        message: String,
    },
    /// Communication with the child failed.
    #[error("engine io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// External evaluator command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEngineConfig {
    /// Program to run.
    pub command: String,
    /// Arguments that make the program only parse its input.
    #[serde(default)]
    pub check_args: Vec<String>,
    /// Arguments that make the program execute its input.
    #[serde(default)]
    pub run_args: Vec<String>,
    /// Extra environment for the child process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProcessEngineConfig {
    /// Validates the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessEngineError::Invalid`] when the command is empty or a
    /// list exceeds its limit.
    pub fn validate(&self) -> Result<(), ProcessEngineError> {
        if self.command.trim().is_empty() {
            return Err(ProcessEngineError::Invalid("engine.command must be non-empty".to_string()));
        }
        if self.check_args.len() > MAX_ARGS || self.run_args.len() > MAX_ARGS {
            return Err(ProcessEngineError::Invalid(format!(
                "engine arguments exceed max of {MAX_ARGS}"
            )));
        }
        if self.env.len() > MAX_ENV_VARS {
            return Err(ProcessEngineError::Invalid(format!(
                "engine.env exceeds max of {MAX_ENV_VARS} entries"
            )));
        }
        if self.env.keys().any(|key| key.is_empty() || key.contains('=')) {
            return Err(ProcessEngineError::Invalid(
                "engine.env keys must be non-empty and must not contain '='".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Source accepted by the evaluator's parse check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessUnit {
    /// Name the unit was compiled under.
    pub filename: String,
    /// Source text.
    pub source: String,
}

/// Accumulated prelude of previously executed units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessScope {
    /// Tier the scope was created for.
    pub tier: OptimizationTier,
    /// Sources executed so far, in order.
    pub prelude: String,
}

/// Engine adapter over an external command.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    /// Command line configuration.
    config: ProcessEngineConfig,
}

impl ProcessEngine {
    /// Creates an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessEngineError::Invalid`] when the configuration is invalid.
    pub fn new(config: ProcessEngineConfig) -> Result<Self, ProcessEngineError> {
        config.validate()?;
        Ok(Self {
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ProcessEngineConfig {
        &self.config
    }

    /// Checks that the command can be started.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessEngineError`] when the command cannot be spawned.
    pub fn probe(&self) -> Result<(), ProcessEngineError> {
        self.invoke(&self.config.check_args, "", OptimizationTier::COMPILED, "probe").map(|_| ())
    }

    /// Runs the command with the given arguments and stdin.
    fn invoke(
        &self,
        args: &[String],
        input: &str,
        tier: OptimizationTier,
        filename: &str,
    ) -> Result<Output, ProcessEngineError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(args);
        cmd.envs(&self.config.env);
        cmd.env(TIER_ENV_VAR, tier.to_string());
        cmd.env(FILENAME_ENV_VAR, filename);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|err| ProcessEngineError::Spawn {
            command: self.config.command.clone(),
            message: err.to_string(),
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProcessEngineError::Io("engine stdin unavailable".to_string()))?;
        thread::scope(|scope| {
            let writer = scope.spawn(move || {
                // The child may exit before reading everything; that is reported
                // through its exit status.
                let _ = stdin.write_all(input.as_bytes());
            });
            let output =
                child.wait_with_output().map_err(|err| ProcessEngineError::Io(err.to_string()));
            let _ = writer.join();
            output
        })
    }

    /// Runs the command and maps a non-zero exit to a failure.
    fn run_checked(
        &self,
        args: &[String],
        input: &str,
        tier: OptimizationTier,
        filename: &str,
    ) -> Result<(), EngineFailure> {
        let output = self
            .invoke(args, input, tier, filename)
            .map_err(|err| EngineFailure::new(format!("Error: {err}")))?;
        if output.status.success() {
            return Ok(());
        }
        Err(failure_from_stderr(&output))
    }
}

impl Engine for ProcessEngine {
    type Unit = ProcessUnit;
    type Scope = ProcessScope;

    fn new_scope(&self, tier: OptimizationTier) -> Self::Scope {
        ProcessScope {
            tier,
            prelude: String::new(),
        }
    }

    fn compile(
        &self,
        source: &str,
        filename: &str,
        tier: OptimizationTier,
    ) -> Result<Self::Unit, EngineFailure> {
        self.run_checked(&self.config.check_args, source, tier, filename)?;
        Ok(ProcessUnit {
            filename: filename.to_string(),
            source: source.to_string(),
        })
    }

    fn execute(&self, unit: &Self::Unit, scope: &mut Self::Scope) -> Result<(), EngineFailure> {
        let program = scoped_program(&scope.prelude, &unit.source);
        self.run_checked(&self.config.run_args, &program, scope.tier, &unit.filename)?;
        scope.prelude = join_sources(&scope.prelude, &unit.source);
        Ok(())
    }
}

/// Builds the program for one execution. A strict unit keeps its prologue at
/// the head of the program so the directive applies ahead of the prelude.
fn scoped_program(prelude: &str, source: &str) -> String {
    match source.strip_prefix(STRICT_PROLOGUE) {
        Some(body) if !prelude.is_empty() => {
            format!("{STRICT_PROLOGUE}{}", join_sources(prelude, body))
        }
        _ => join_sources(prelude, source),
    }
}

/// Appends a unit to a prelude, one unit per line block.
fn join_sources(prelude: &str, source: &str) -> String {
    if prelude.is_empty() {
        return source.to_string();
    }
    let separator = if prelude.ends_with('\n') { "" } else { "\n" };
    format!("{prelude}{separator}{source}")
}

/// Builds a failure from the child's stderr.
fn failure_from_stderr(output: &Output) -> EngineFailure {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut lines = stderr.lines().skip_while(|line| line.trim().is_empty());
    let Some(details) = lines.next() else {
        return EngineFailure::new(format!("Error: engine exited with {}", output.status));
    };
    let trace = lines.collect::<Vec<_>>().join("\n");
    let failure = EngineFailure::new(details.trim());
    if trace.trim().is_empty() { failure } else { failure.with_trace(trace.trim_end()) }
}
