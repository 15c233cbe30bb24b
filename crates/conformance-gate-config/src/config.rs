// conformance-gate-config/src/config.rs
// ============================================================================
// Module: Conformance Gate Configuration
// Description: Configuration loading and validation for conformance runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: conformance-gate-core, conformance-gate-engines, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Relative paths are resolved against the directory holding the config file,
//! so a config checked into a repository works from any working directory.
//! Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use conformance_gate_core::ExpansionPolicy;
use conformance_gate_core::FsCorpus;
use conformance_gate_core::HarnessLayout;
use conformance_gate_core::OptimizationTier;
use conformance_gate_core::VariantExpander;
use conformance_gate_engines::ProcessEngineConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "conformance-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CONFORMANCE_GATE_CONFIG";
/// Environment variable that pins the run to a single tier.
pub const TIER_ENV_VAR: &str = "TEST_262_OPTLEVEL";
/// Property consulted when the tier environment variable is unset.
pub const TIER_PROPERTY: &str = "TEST_OPTLEVEL";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum directive file size in bytes.
pub(crate) const MAX_DIRECTIVES_FILE_SIZE: usize = 4 * 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of tiers.
pub(crate) const MAX_TIERS: usize = 16;
/// Maximum number of worker threads.
pub(crate) const MAX_WORKERS: usize = 1024;
/// Maximum number of unsupported features or flags.
pub(crate) const MAX_POLICY_ENTRIES: usize = 1024;
/// Maximum number of properties.
pub(crate) const MAX_PROPERTIES: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Conformance Gate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConformanceConfig {
    /// Corpus layout.
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Execution matrix and skip policy.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// External evaluator command, required to run cases.
    #[serde(default)]
    pub engine: Option<ProcessEngineConfig>,
    /// Free-form properties, consulted for the tier override.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Directory relative paths resolve against (not serialized).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Corpus layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Checkout of the conformance suite, relative to the config file.
    #[serde(default = "default_suite_root")]
    pub root: PathBuf,
    /// Case directory inside the suite root; directives are relative to it.
    #[serde(default = "default_test_dir")]
    pub test_dir: PathBuf,
    /// Helper script directory inside the suite root.
    #[serde(default = "default_harness_dir")]
    pub harness_dir: PathBuf,
    /// Directive file, relative to the config file.
    #[serde(default = "default_exclusions")]
    pub exclusions: PathBuf,
    /// Replacement for the upstream baseline-setup helper.
    #[serde(default)]
    pub sta_override: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            root: default_suite_root(),
            test_dir: default_test_dir(),
            harness_dir: default_harness_dir(),
            exclusions: default_exclusions(),
            sta_override: None,
        }
    }
}

impl SuiteConfig {
    /// Validates suite paths.
    fn validate(&self) -> Result<(), ConformanceConfigError> {
        validate_path_string("suite.root", &self.root)?;
        validate_path_string("suite.test_dir", &self.test_dir)?;
        validate_path_string("suite.harness_dir", &self.harness_dir)?;
        validate_path_string("suite.exclusions", &self.exclusions)?;
        validate_nested("suite.test_dir", &self.test_dir)?;
        validate_nested("suite.harness_dir", &self.harness_dir)?;
        if let Some(sta) = &self.sta_override {
            validate_path_string("suite.sta_override", sta)?;
        }
        Ok(())
    }
}

/// Execution matrix configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Optimization tiers every case runs at.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<i32>,
    /// Worker threads; zero selects the available parallelism.
    #[serde(default)]
    pub workers: usize,
    /// Features whose cases are skipped.
    #[serde(default = "default_unsupported_features")]
    pub unsupported_features: Vec<String>,
    /// Flags whose cases are skipped.
    #[serde(default = "default_unsupported_flags")]
    pub unsupported_flags: Vec<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            workers: 0,
            unsupported_features: default_unsupported_features(),
            unsupported_flags: default_unsupported_flags(),
        }
    }
}

impl ExecutionConfig {
    /// Validates the execution matrix.
    fn validate(&self) -> Result<(), ConformanceConfigError> {
        if self.tiers.is_empty() {
            return Err(ConformanceConfigError::Invalid(
                "execution.tiers must be non-empty".to_string(),
            ));
        }
        if self.tiers.len() > MAX_TIERS {
            return Err(ConformanceConfigError::Invalid(format!(
                "execution.tiers exceeds max of {MAX_TIERS}"
            )));
        }
        let mut seen = BTreeSet::new();
        for tier in &self.tiers {
            if !seen.insert(*tier) {
                return Err(ConformanceConfigError::Invalid(format!(
                    "duplicate execution.tiers entry: {tier}"
                )));
            }
        }
        if self.workers > MAX_WORKERS {
            return Err(ConformanceConfigError::Invalid(format!(
                "execution.workers exceeds max of {MAX_WORKERS}"
            )));
        }
        validate_names("execution.unsupported_features", &self.unsupported_features)?;
        validate_names("execution.unsupported_flags", &self.unsupported_flags)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ConformanceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConformanceConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConformanceConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConformanceConfigError::Invalid(
                "config file exceeds size limit".to_string(),
            ));
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| {
            ConformanceConfigError::Invalid("config file must be utf-8".to_string())
        })?;
        let base_dir = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(content, base_dir)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError`] when parsing or validation fails.
    pub fn from_toml_str(
        content: &str,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConformanceConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConformanceConfigError::Parse(err.to_string()))?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConformanceConfigError> {
        self.suite.validate()?;
        self.execution.validate()?;
        if let Some(engine) = &self.engine {
            engine.validate().map_err(|err| ConformanceConfigError::Invalid(err.to_string()))?;
        }
        if self.properties.len() > MAX_PROPERTIES {
            return Err(ConformanceConfigError::Invalid(format!(
                "properties exceeds max of {MAX_PROPERTIES} entries"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Derived paths
    // ------------------------------------------------------------------------

    /// Returns the directory relative paths resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the directory case paths and directives are relative to.
    #[must_use]
    pub fn corpus_root(&self) -> PathBuf {
        self.base_dir.join(&self.suite.root).join(&self.suite.test_dir)
    }

    /// Returns the corpus location as written in the config, `/`-separated.
    /// Exclusion suffixes may spell it out, e.g. `!test/built-ins/x.js`.
    #[must_use]
    pub fn exclusion_match_prefix(&self) -> String {
        self.suite
            .root
            .join(&self.suite.test_dir)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Returns the helper script directory.
    #[must_use]
    pub fn harness_dir(&self) -> PathBuf {
        self.base_dir.join(&self.suite.root).join(&self.suite.harness_dir)
    }

    /// Returns the directive file path.
    #[must_use]
    pub fn exclusions_path(&self) -> PathBuf {
        self.base_dir.join(&self.suite.exclusions)
    }

    /// Returns the baseline-setup override path, if configured.
    #[must_use]
    pub fn sta_override_path(&self) -> Option<PathBuf> {
        self.suite.sta_override.as_ref().map(|path| self.base_dir.join(path))
    }

    /// Returns the filesystem corpus.
    #[must_use]
    pub fn corpus(&self) -> FsCorpus {
        FsCorpus::new(self.corpus_root())
    }

    /// Returns the helper script layout.
    #[must_use]
    pub fn harness_layout(&self) -> HarnessLayout {
        HarnessLayout::new(
            self.harness_dir().display().to_string(),
            self.sta_override_path().map(|path| path.display().to_string()),
        )
    }

    /// Reads the directive file.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError`] when the file is missing, too large,
    /// or not utf-8.
    pub fn read_directives(&self) -> Result<String, ConformanceConfigError> {
        let path = self.exclusions_path();
        let bytes = fs::read(&path).map_err(|err| {
            ConformanceConfigError::Io(format!("{}: {err}", path.display()))
        })?;
        if bytes.len() > MAX_DIRECTIVES_FILE_SIZE {
            return Err(ConformanceConfigError::Invalid(
                "directive file exceeds size limit".to_string(),
            ));
        }
        String::from_utf8(bytes).map_err(|_| {
            ConformanceConfigError::Invalid("directive file must be utf-8".to_string())
        })
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Returns the skip policy.
    #[must_use]
    pub fn expansion_policy(&self) -> ExpansionPolicy {
        ExpansionPolicy {
            unsupported_features: self.execution.unsupported_features.iter().cloned().collect(),
            unsupported_flags: self.execution.unsupported_flags.iter().cloned().collect(),
        }
    }

    /// Returns the tiers to run.
    ///
    /// `env_override` is the value of [`TIER_ENV_VAR`]; when absent the
    /// [`TIER_PROPERTY`] property is consulted in `cli_properties` first and
    /// then in the `[properties]` table. Any override pins the run to that
    /// single tier.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError::Invalid`] when the override is not an
    /// integer.
    pub fn effective_tiers(
        &self,
        env_override: Option<&str>,
        cli_properties: &BTreeMap<String, String>,
    ) -> Result<Vec<OptimizationTier>, ConformanceConfigError> {
        let overridden = env_override
            .map(|value| (TIER_ENV_VAR, value))
            .or_else(|| cli_properties.get(TIER_PROPERTY).map(|value| (TIER_PROPERTY, value.as_str())))
            .or_else(|| self.properties.get(TIER_PROPERTY).map(|value| (TIER_PROPERTY, value.as_str())));
        if let Some((source, value)) = overridden {
            let tier = value.parse::<OptimizationTier>().map_err(|_| {
                ConformanceConfigError::Invalid(format!("{source} must be an integer, got '{value}'"))
            })?;
            return Ok(vec![tier]);
        }
        Ok(self.execution.tiers.iter().copied().map(OptimizationTier::new).collect())
    }

    /// Returns the variant expander for the given tiers.
    #[must_use]
    pub fn expander(&self, tiers: Vec<OptimizationTier>) -> VariantExpander {
        VariantExpander::new(self.expansion_policy(), tiers)
    }

    /// Returns the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceConfigError::Invalid`] when no `[engine]` section
    /// is configured.
    pub fn engine_config(&self) -> Result<&ProcessEngineConfig, ConformanceConfigError> {
        self.engine.as_ref().ok_or_else(|| {
            ConformanceConfigError::Invalid("[engine] section is required to run cases".to_string())
        })
    }
}

/// Reads the tier override from the environment.
#[must_use]
pub fn tier_override_from_env() -> Option<String> {
    env::var(TIER_ENV_VAR).ok()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConformanceConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConformanceConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConformanceConfigError::Invalid(
                "config path exceeds max length".to_string(),
            ));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConformanceConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConformanceConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConformanceConfigError::Invalid(
                "config path component too long".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates a configured path against length constraints.
fn validate_path_string(field: &str, value: &Path) -> Result<(), ConformanceConfigError> {
    let text = value.to_string_lossy();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConformanceConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConformanceConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in value.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConformanceConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Requires a path to stay inside its parent directory.
fn validate_nested(field: &str, value: &Path) -> Result<(), ConformanceConfigError> {
    let escapes = value
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConformanceConfigError::Invalid(format!(
            "{field} must be a relative path inside suite.root"
        )));
    }
    Ok(())
}

/// Validates a list of feature or flag names.
fn validate_names(field: &str, values: &[String]) -> Result<(), ConformanceConfigError> {
    if values.len() > MAX_POLICY_ENTRIES {
        return Err(ConformanceConfigError::Invalid(format!(
            "{field} exceeds max of {MAX_POLICY_ENTRIES} entries"
        )));
    }
    for value in values {
        if value.trim().is_empty() || value.trim() != value {
            return Err(ConformanceConfigError::Invalid(format!(
                "{field} entries must be non-empty and trimmed"
            )));
        }
    }
    Ok(())
}

/// Default suite checkout directory.
fn default_suite_root() -> PathBuf {
    PathBuf::from("test262")
}

/// Default case directory.
fn default_test_dir() -> PathBuf {
    PathBuf::from("test")
}

/// Default helper script directory.
fn default_harness_dir() -> PathBuf {
    PathBuf::from("harness")
}

/// Default directive file.
fn default_exclusions() -> PathBuf {
    PathBuf::from("test262.properties")
}

/// Default tier matrix.
fn default_tiers() -> Vec<i32> {
    OptimizationTier::default_matrix().iter().map(|tier| tier.level()).collect()
}

/// Default unsupported flags.
fn default_unsupported_flags() -> Vec<String> {
    ExpansionPolicy::default().unsupported_flags.into_iter().collect()
}

/// Default unsupported features.
fn default_unsupported_features() -> Vec<String> {
    [
        "Atomics",
        "BigInt",
        "IsHTMLDDA",
        "Promise.prototype.finally",
        "Proxy",
        "Reflect",
        "Reflect.construct",
        "Reflect.set",
        "Reflect.setPrototypeOf",
        "SharedArrayBuffer",
        "async-functions",
        "async-iteration",
        "class",
        "class-fields-private",
        "class-fields-public",
        "computed-property-names",
        "cross-realm",
        "default-arg",
        "default-parameters",
        "new.target",
        "object-rest",
        "regexp-dotall",
        "regexp-lookbehind",
        "regexp-named-groups",
        "regexp-unicode-property-escapes",
        "super",
        "tail-call-optimization",
        "u180e",
        "Symbol.isConcatSpreadable",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
