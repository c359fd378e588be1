//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillcheck_core::model::{DEFAULT_CUSTOM_DURATION_SECS, DEFAULT_QUESTION_SECS, MIN_QUESTION_SECS};
use skillcheck_core::session::SessionConfig;

/// Top-level skillcheck configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillcheckConfig {
    /// Catalog file or directory.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Result log snapshot.
    #[serde(default = "default_results")]
    pub results: PathBuf,
    /// Countdown period in milliseconds. Each tick counts as one second.
    #[serde(default = "default_tick_period")]
    pub tick_period_ms: u64,
    /// Budget for a question without its own.
    #[serde(default = "default_question_secs")]
    pub default_question_secs: u64,
    /// Budget for a custom test without a duration.
    #[serde(default = "default_custom_duration_secs")]
    pub default_custom_duration_secs: u64,
}

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog.toml")
}
fn default_results() -> PathBuf {
    PathBuf::from("./skillcheck-results/results.json")
}
fn default_tick_period() -> u64 {
    1000
}
fn default_question_secs() -> u64 {
    DEFAULT_QUESTION_SECS
}
fn default_custom_duration_secs() -> u64 {
    DEFAULT_CUSTOM_DURATION_SECS
}

impl Default for SkillcheckConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            results: default_results(),
            tick_period_ms: default_tick_period(),
            default_question_secs: default_question_secs(),
            default_custom_duration_secs: default_custom_duration_secs(),
        }
    }
}

impl SkillcheckConfig {
    /// Session budgets derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            default_question_secs: self.default_question_secs.max(1),
            min_question_secs: MIN_QUESTION_SECS,
            default_custom_duration_secs: self.default_custom_duration_secs.max(1),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillcheck.toml` in the current directory
/// 2. `~/.config/skillcheck/config.toml`
///
/// Environment variable overrides: `SKILLCHECK_CATALOG`, `SKILLCHECK_RESULTS`.
pub fn load_config() -> Result<SkillcheckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillcheckConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("skillcheck.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SkillcheckConfig::default(),
    };

    if let Ok(catalog) = std::env::var("SKILLCHECK_CATALOG") {
        if !catalog.is_empty() {
            config.catalog = PathBuf::from(catalog);
        }
    }
    if let Ok(results) = std::env::var("SKILLCHECK_RESULTS") {
        if !results.is_empty() {
            config.results = PathBuf::from(results);
        }
    }

    Ok(config)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SkillcheckConfig> {
    let config: SkillcheckConfig = toml::from_str(content)?;
    if config.tick_period_ms == 0 {
        anyhow::bail!("tick_period_ms must be greater than zero");
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillcheck"))
}
