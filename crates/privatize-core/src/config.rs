//! Transformer configuration and its layered resolution.
//!
//! The transform itself only ever sees a [`TransformerConfig`]: an immutable
//! record with defaults already applied. Hosts build one either directly from
//! a [`RawTransformerConfig`] (the `{ includeInternal, customPrefix }` shape a
//! build tool passes in) or through [`ResolvedConfig::resolve`], which layers
//! defaults, a `privatize.json` file, environment variables and CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PrivatizeError;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "_";

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "privatize.json";

/// Environment variable overriding the prefix.
pub const ENV_PREFIX: &str = "PRIVATIZE_PREFIX";

/// Environment variable overriding `includeInternal`.
pub const ENV_INCLUDE_INTERNAL: &str = "PRIVATIZE_INCLUDE_INTERNAL";

/// A prefix must itself be a valid identifier so that `prefix + name` is one.
const PREFIX_PATTERN: &str = r"^[A-Za-z_$][A-Za-z0-9_$]*$";

// ============================================================================
// Transformer Configuration
// ============================================================================

/// Configuration as supplied by a host, before defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTransformerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_internal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prefix: Option<String>,
}

impl RawTransformerConfig {
    /// Apply defaults: `includeInternal` false, prefix `_`.
    pub fn resolve(&self) -> TransformerConfig {
        TransformerConfig {
            include_internal: self.include_internal.unwrap_or(false),
            prefix: self
                .custom_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        }
    }

    /// Decode a JSON configuration document.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, PrivatizeError> {
        serde_json::from_str(text).map_err(|e| PrivatizeError::ConfigError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and decode a configuration file.
    pub fn load(path: &Path) -> Result<Self, PrivatizeError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PrivatizeError::file_not_found(&display)
            } else {
                PrivatizeError::io(&display, &e)
            }
        })?;
        Self::from_json_str(&text, &display)
    }
}

/// Immutable transformer configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerConfig {
    include_internal: bool,
    prefix: String,
}

impl TransformerConfig {
    pub fn new(include_internal: bool, prefix: impl Into<String>) -> Self {
        TransformerConfig {
            include_internal,
            prefix: prefix.into(),
        }
    }

    /// Whether `@internal` JSDoc tags mark a member private.
    pub fn include_internal(&self) -> bool {
        self.include_internal
    }

    /// The string prepended to private member names.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for TransformerConfig {
    fn default() -> Self {
        RawTransformerConfig::default().resolve()
    }
}

impl From<RawTransformerConfig> for TransformerConfig {
    fn from(raw: RawTransformerConfig) -> Self {
        raw.resolve()
    }
}

/// Check that a prefix keeps renamed members valid identifiers.
pub fn validate_prefix(prefix: &str) -> Result<(), PrivatizeError> {
    let pattern = Regex::new(PREFIX_PATTERN)
        .map_err(|e| PrivatizeError::internal(format!("bad prefix pattern: {}", e)))?;
    if pattern.is_match(prefix) {
        Ok(())
    } else {
        Err(PrivatizeError::invalid_args_with_details(
            format!("prefix '{}' is not a valid identifier", prefix),
            serde_json::json!({ "prefix": prefix, "pattern": PREFIX_PATTERN }),
        ))
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From `privatize.json` or `--config`.
    ConfigFile = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::ConfigFile => "config_file",
            ConfigSource::EnvVar => "env_var",
            ConfigSource::CliFlag => "cli_flag",
        }
    }
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --include-internal flag.
    pub include_internal: Option<bool>,
    /// --prefix flag.
    pub prefix: Option<String>,
    /// --config flag.
    pub config_path: Option<PathBuf>,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub include_internal: ConfigValue<bool>,
    pub prefix: ConfigValue<String>,
    /// The configuration file that was read, if any.
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            include_internal: ConfigValue::new(false, ConfigSource::Default),
            prefix: ConfigValue::new(DEFAULT_PREFIX.to_string(), ConfigSource::Default),
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from all sources, reading the process environment.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file (`--config`, else `privatize.json` in `working_dir`)
    /// 4. Defaults
    pub fn resolve(working_dir: &Path, cli: &CliOverrides) -> Result<Self, PrivatizeError> {
        Self::resolve_with_env(working_dir, cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        working_dir: &Path,
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PrivatizeError> {
        let mut config = ResolvedConfig::default();

        match &cli.config_path {
            Some(path) => config.apply_config_file(path)?,
            None => {
                let path = working_dir.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    config.apply_config_file(&path)?;
                }
            }
        }

        config.apply_env_vars(env)?;
        config.apply_cli_overrides(cli);

        validate_prefix(&config.prefix.value).map_err(|err| match err {
            PrivatizeError::InvalidArguments { message, .. } => {
                PrivatizeError::invalid_args_with_details(
                    message,
                    serde_json::json!({
                        "prefix": config.prefix.value,
                        "source": config.prefix.source.as_str(),
                    }),
                )
            }
            other => other,
        })?;

        debug!(
            include_internal = config.include_internal.value,
            include_internal_source = config.include_internal.source.as_str(),
            prefix = %config.prefix.value,
            prefix_source = config.prefix.source.as_str(),
            "resolved configuration"
        );
        Ok(config)
    }

    /// The immutable configuration handed to the transform.
    pub fn transformer_config(&self) -> TransformerConfig {
        TransformerConfig::new(self.include_internal.value, self.prefix.value.clone())
    }

    fn apply_config_file(&mut self, path: &Path) -> Result<(), PrivatizeError> {
        let raw = RawTransformerConfig::load(path)?;
        debug!(path = %path.display(), "loaded config file");
        if let Some(include_internal) = raw.include_internal {
            self.include_internal = self
                .include_internal
                .clone()
                .merge(ConfigValue::new(include_internal, ConfigSource::ConfigFile));
        }
        if let Some(prefix) = raw.custom_prefix {
            self.prefix = self
                .prefix
                .clone()
                .merge(ConfigValue::new(prefix, ConfigSource::ConfigFile));
        }
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    fn apply_env_vars(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), PrivatizeError> {
        if let Some(raw) = env(ENV_INCLUDE_INTERNAL) {
            let value = parse_bool(&raw).ok_or_else(|| {
                PrivatizeError::invalid_args_with_details(
                    format!("{} must be a boolean, got '{}'", ENV_INCLUDE_INTERNAL, raw),
                    serde_json::json!({ "variable": ENV_INCLUDE_INTERNAL, "value": raw }),
                )
            })?;
            self.include_internal = ConfigValue::new(value, ConfigSource::EnvVar);
        }
        if let Some(prefix) = env(ENV_PREFIX) {
            self.prefix = ConfigValue::new(prefix, ConfigSource::EnvVar);
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(include_internal) = overrides.include_internal {
            self.include_internal = ConfigValue::new(include_internal, ConfigSource::CliFlag);
        }
        if let Some(ref prefix) = overrides.prefix {
            self.prefix = ConfigValue::new(prefix.clone(), ConfigSource::CliFlag);
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
