//! Configuration and input files.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use lexiforge_cache::CacheConfig;
use lexiforge_core::LanguageDefinition;
use lexiforge_runtime::{ExecutorConfig, PipelineConfig, RetryPolicy};
use lexiforge_validate::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tunable in one file. Missing sections and fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Validator sampling and thresholds
    pub validator: ValidatorConfig,
    /// Cache TTLs
    pub cache: CacheConfig,
    /// Transport retries and timeout
    pub retry: RetryPolicy,
    /// Semantic attempt budget
    pub executor: ExecutorConfig,
    /// Pipeline sizing and pacing
    pub pipeline: PipelineConfig,
}

impl ForgeConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .wrap_err_with(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Read a language definition from a JSON file
pub fn load_definition(path: &Path) -> Result<LanguageDefinition> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading definition {}", path.display()))?;
    LanguageDefinition::from_json(&text)
        .wrap_err_with(|| format!("decoding definition {}", path.display()))
}
