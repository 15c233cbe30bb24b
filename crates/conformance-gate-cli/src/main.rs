// conformance-gate-cli/src/main.rs
// ============================================================================
// Module: Conformance Gate CLI Entry Point
// Description: Command dispatcher for planning and running conformance suites.
// Purpose: Provide a safe CLI over the suite planner, runner, and config.
// Dependencies: clap, conformance-gate-config, conformance-gate-core,
// conformance-gate-engines, serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The Conformance Gate CLI loads `conformance-gate.toml`, resolves the
//! directive file against the corpus, and either reports the resulting plan
//! or runs it through the configured external engine. All user-facing strings
//! are routed through the message catalog. Diagnostics are emitted as JSON
//! lines on stderr and optionally appended to a log file.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use conformance_gate_cli::t;
use conformance_gate_config::ConformanceConfig;
use conformance_gate_config::tier_override_from_env;
use conformance_gate_core::CasePath;
use conformance_gate_core::DiagnosticSink;
use conformance_gate_core::FileDiagnosticSink;
use conformance_gate_core::FsCorpus;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::PlanRequest;
use conformance_gate_core::STA_HELPER;
use conformance_gate_core::StderrDiagnosticSink;
use conformance_gate_core::StrictMode;
use conformance_gate_core::SuitePlan;
use conformance_gate_core::SuiteReport;
use conformance_gate_core::SuiteRunner;
use conformance_gate_core::TeeDiagnosticSink;
use conformance_gate_core::VerdictKind;
use conformance_gate_core::plan_suite;
use conformance_gate_engines::ProcessEngine;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "conformance-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Options shared by every subcommand.
    #[command(flatten)]
    global: GlobalArgs,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file path (defaults to conformance-gate.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Property override, e.g. `-D TEST_OPTLEVEL=9`.
    #[arg(
        short = 'D',
        value_name = "KEY=VALUE",
        value_parser = parse_property,
        action = ArgAction::Append,
        global = true
    )]
    properties: Vec<(String, String)>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve directives and report the run plan without executing.
    Plan(PlanCommand),
    /// Execute the run plan with the configured engine.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Only plan cases whose path contains this substring.
    #[arg(long, value_name = "SUBSTRING")]
    filter: Option<String>,
    /// Emit the plan as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Only run cases whose path contains this substring.
    #[arg(long, value_name = "SUBSTRING")]
    filter: Option<String>,
    /// Worker threads (overrides `execution.workers`; 0 selects all cores).
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// Append diagnostics as JSON lines to this file.
    #[arg(long, value_name = "PATH")]
    diagnostics_log: Option<PathBuf>,
    /// Emit the report as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the config file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Plan(command) => command_plan(&cli.global, &command),
        Commands::Run(command) => command_run(&cli.global, &command),
        Commands::Config {
            command,
        } => command_config(&cli.global, &command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Session Setup
// ============================================================================

/// Loaded config plus everything derived from it for one invocation.
struct Session {
    /// Validated configuration.
    config: ConformanceConfig,
    /// Tiers after environment and property overrides.
    tiers: Vec<OptimizationTier>,
    /// Directive file contents.
    directives: String,
}

impl Session {
    /// Loads config, tier overrides, and the directive file.
    fn open(global: &GlobalArgs) -> CliResult<Self> {
        let config = load_config(global)?;
        let tiers = resolve_tiers(&config, global)?;
        let directives = config
            .read_directives()
            .map_err(|err| CliError::new(t!("directives.read_failed", error = err)))?;
        Ok(Self {
            config,
            tiers,
            directives,
        })
    }

    /// Resolves, loads, and expands the suite.
    fn plan(
        &self,
        corpus: &FsCorpus,
        filter: Option<&str>,
        diagnostics: &dyn DiagnosticSink,
    ) -> CliResult<SuitePlan> {
        let layout = self.config.harness_layout();
        let expander = self.config.expander(self.tiers.clone());
        let match_prefix = self.config.exclusion_match_prefix();
        let request = PlanRequest {
            directives: &self.directives,
            layout: &layout,
            expander: &expander,
            filter,
            match_prefix: Some(&match_prefix),
        };
        plan_suite(corpus, request, diagnostics)
            .map_err(|err| CliError::new(t!("plan.failed", error = err)))
    }
}

/// Loads and validates the config file.
fn load_config(global: &GlobalArgs) -> CliResult<ConformanceConfig> {
    ConformanceConfig::load(global.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Applies the environment and property tier overrides.
fn resolve_tiers(
    config: &ConformanceConfig,
    global: &GlobalArgs,
) -> CliResult<Vec<OptimizationTier>> {
    let env_override = tier_override_from_env();
    let properties = property_map(&global.properties);
    config
        .effective_tiers(env_override.as_deref(), &properties)
        .map_err(|err| CliError::new(t!("tiers.invalid", error = err)))
}

/// Parses a `KEY=VALUE` property argument.
fn parse_property(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, property)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), property.to_string()))
        }
        _ => Err(t!("property.invalid", value = value)),
    }
}

/// Collects property arguments; later occurrences win.
fn property_map(properties: &[(String, String)]) -> BTreeMap<String, String> {
    properties.iter().cloned().collect()
}

// ============================================================================
// SECTION: Plan Command
// ============================================================================

/// Serializable view of a run plan.
#[derive(Debug, Serialize)]
struct PlanView<'a> {
    /// Tiers every case is expanded over.
    tiers: &'a [OptimizationTier],
    /// Number of loaded case files.
    loaded: usize,
    /// Files expected to fail.
    soft_excluded: Vec<&'a CasePath>,
    /// Files that never run.
    hard_excluded: Vec<&'a CasePath>,
    /// Planned configurations in execution order.
    configurations: Vec<PlannedConfiguration<'a>>,
    /// Cases skipped by policy.
    skipped: Vec<SkippedView<'a>>,
}

/// Serializable view of one planned configuration.
#[derive(Debug, Serialize)]
struct PlannedConfiguration<'a> {
    /// Display name.
    name: String,
    /// Case path.
    path: &'a CasePath,
    /// Optimization tier.
    tier: OptimizationTier,
    /// Strict-mode variant.
    strict: StrictMode,
    /// True when failures are tolerated.
    soft_excluded: bool,
}

/// Serializable view of a skipped case.
#[derive(Debug, Serialize)]
struct SkippedView<'a> {
    /// Case path.
    path: &'a CasePath,
    /// Skip reason.
    reason: String,
}

impl<'a> PlanView<'a> {
    /// Builds the view from a plan.
    fn from_plan(plan: &'a SuitePlan) -> Self {
        Self {
            tiers: plan.tiers(),
            loaded: plan.loaded(),
            soft_excluded: plan.exclusions().soft_excluded().iter().collect(),
            hard_excluded: plan.exclusions().hard_excluded().iter().collect(),
            configurations: plan
                .configurations()
                .iter()
                .map(|config| PlannedConfiguration {
                    name: config.to_string(),
                    path: config.path(),
                    tier: config.tier(),
                    strict: config.strict(),
                    soft_excluded: config.is_soft_excluded(),
                })
                .collect(),
            skipped: plan
                .skipped()
                .iter()
                .map(|skipped| SkippedView {
                    path: &skipped.path,
                    reason: skipped.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Executes the `plan` command.
fn command_plan(global: &GlobalArgs, command: &PlanCommand) -> CliResult<ExitCode> {
    let session = Session::open(global)?;
    let corpus = session.config.corpus();
    let sink = StderrDiagnosticSink;
    let plan = session.plan(&corpus, command.filter.as_deref(), &sink)?;
    if command.json {
        write_json(&PlanView::from_plan(&plan), &t!("plan.kind"))?;
        return Ok(ExitCode::SUCCESS);
    }
    for skipped in plan.skipped() {
        write_stdout(&t!("plan.skipped", path = skipped.path, reason = skipped.reason))?;
    }
    write_stdout(&t!("plan.tiers", tiers = join_tiers(plan.tiers())))?;
    write_stdout(&plan_summary(&plan))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats the one-line plan summary.
fn plan_summary(plan: &SuitePlan) -> String {
    t!(
        "plan.summary",
        configurations = plan.configurations().len(),
        loaded = plan.loaded(),
        skipped = plan.skipped().len(),
        soft = plan.exclusions().soft_excluded().len(),
        hard = plan.exclusions().hard_excluded().len()
    )
}

/// Formats tiers as a comma-separated list.
fn join_tiers(tiers: &[OptimizationTier]) -> String {
    tiers.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(global: &GlobalArgs, command: &RunCommand) -> CliResult<ExitCode> {
    let session = Session::open(global)?;
    let engine_config = session
        .config
        .engine_config()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let engine = ProcessEngine::new(engine_config.clone())
        .map_err(|err| CliError::new(t!("run.engine.invalid", error = err)))?;
    engine.probe().map_err(|err| CliError::new(t!("run.engine.probe_failed", error = err)))?;

    let file_sink = command
        .diagnostics_log
        .as_deref()
        .map(open_diagnostics_log)
        .transpose()?;
    let stderr_sink = StderrDiagnosticSink;
    let mut sinks: Vec<&dyn DiagnosticSink> = vec![&stderr_sink];
    if let Some(file_sink) = &file_sink {
        sinks.push(file_sink);
    }
    let diagnostics = TeeDiagnosticSink::new(sinks);

    let corpus = session.config.corpus();
    let plan = session.plan(&corpus, command.filter.as_deref(), &diagnostics)?;
    let workers = command.workers.unwrap_or(session.config.execution.workers);
    let report = SuiteRunner::new(workers).run(&plan, &engine, &corpus, &diagnostics);

    if command.json {
        write_json(&report, &t!("run.kind"))?;
    } else {
        render_report(&report)?;
    }
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Opens the diagnostics log file.
fn open_diagnostics_log(path: &Path) -> CliResult<FileDiagnosticSink> {
    FileDiagnosticSink::new(path).map_err(|err| {
        CliError::new(t!("run.diagnostics_log.open_failed", path = path.display(), error = err))
    })
}

/// Writes failures, stale exclusions, and the summary to stdout.
fn render_report(report: &SuiteReport) -> CliResult<()> {
    for failure in report.failures() {
        write_stdout(&t!("run.failure", name = failure.name()))?;
        if let Some(reason) = failure.outcome.reason() {
            for line in reason.lines() {
                write_stdout(&format!("    {line}"))?;
            }
        }
    }
    for path in &report.stale_exclusions {
        write_stdout(&t!("run.stale", path = path))?;
    }
    write_stdout(&report_summary(report))
}

/// Formats the one-line report summary.
fn report_summary(report: &SuiteReport) -> String {
    let counts = report.verdict_counts();
    let count = |kind: VerdictKind| counts.get(&kind).copied().unwrap_or(0);
    t!(
        "run.summary",
        total = report.results.len(),
        passed = count(VerdictKind::Passed),
        expected = count(VerdictKind::ExpectedFailure),
        ignored = count(VerdictKind::Ignored),
        unexpected_failure = count(VerdictKind::UnexpectedFailure),
        unexpected_pass = count(VerdictKind::UnexpectedPass),
        harness = report.harness_failures()
    )
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(global: &GlobalArgs, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(global),
    }
}

/// Executes the config validation command.
fn command_config_validate(global: &GlobalArgs) -> CliResult<ExitCode> {
    let config = load_config(global)?;
    let tiers = resolve_tiers(&config, global)?;
    write_stdout(&t!("config.validate.ok"))?;
    write_stdout(&t!("config.validate.corpus", path = config.corpus_root().display()))?;
    write_stdout(&t!("config.validate.tiers", tiers = join_tiers(&tiers)))?;
    match config.sta_override_path() {
        Some(path) => {
            write_stdout(&t!("config.validate.sta_override", path = path.display()))?;
        }
        None => {
            let path = config.harness_dir().join(STA_HELPER);
            write_stdout(&t!("config.validate.sta_upstream", path = path.display()))?;
        }
    }
    if config.engine.is_none() {
        write_stdout(&t!("config.validate.engine_missing"))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout, mapping failures into CLI errors.
fn write_stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T, kind: &str) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", kind = kind, error = err)))?;
    write_stdout(&rendered)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error to stderr and returns a failing exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
