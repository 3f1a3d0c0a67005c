//! Configuration file parsing for `prax-hydrate.toml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{HydrateError, HydrateResult};
use crate::relations::{AssociationPath, DEFAULT_DELIMITER};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "prax-hydrate.toml";

/// Main configuration structure for `prax-hydrate.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HydratorConfig {
    /// Path handling.
    #[serde(default)]
    pub hydration: HydrationConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Association paths hydrated by default, per root model.
    #[serde(default)]
    pub presets: IndexMap<String, Vec<String>>,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl HydratorConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> HydrateResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HydrateError::invalid_config(format!("cannot read {}", path.display())).with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> HydrateResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self = toml::from_str(&expanded)
            .map_err(|e| HydrateError::invalid_config(e.message().to_string()).with_source(e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(debug) = overrides.debug {
                if let Some(log_queries) = debug.log_queries {
                    self.debug.log_queries = log_queries;
                }
                if let Some(threshold) = debug.slow_query_threshold {
                    self.debug.slow_query_threshold = threshold;
                }
            }
            if let Some(presets) = overrides.presets {
                self.presets.extend(presets);
            }
        }
        self
    }

    /// Preset paths configured for a model.
    pub fn presets_for(&self, model: &str) -> &[String] {
        self.presets.get(model).map(Vec::as_slice).unwrap_or_default()
    }

    fn validate(&self) -> HydrateResult<()> {
        let delimiter = self.hydration.delimiter;
        if delimiter.is_whitespace() {
            return Err(HydrateError::invalid_config("delimiter cannot be whitespace")
                .with_help("Use a visible separator such as '.' or '/'"));
        }

        let overrides = self
            .environments
            .values()
            .filter_map(|env| env.presets.as_ref());
        for presets in std::iter::once(&self.presets).chain(overrides) {
            for (model, paths) in presets {
                for path in paths {
                    AssociationPath::parse_with(path, delimiter).map_err(|e| {
                        HydrateError::invalid_config(format!("invalid preset for {}: {}", model, e.message))
                            .with_model(model.as_str())
                    })?;
                }
            }
        }
        Ok(())
    }
}

/// Path handling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HydrationConfig {
    /// Separator between association names in a path.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

/// Debug configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log the SQL of every batched fetch.
    #[serde(default)]
    pub log_queries: bool,

    /// Slow fetch threshold in milliseconds.
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_queries: false,
            slow_query_threshold: default_slow_query_threshold(),
        }
    }
}

fn default_slow_query_threshold() -> u64 { 1000 }

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Debug overrides.
    pub debug: Option<DebugOverride>,

    /// Presets added or replaced per model.
    pub presets: Option<IndexMap<String, Vec<String>>>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_queries.
    pub log_queries: Option<bool>,

    /// Override slow_query_threshold.
    pub slow_query_threshold: Option<u64>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
