//! Configuration file support for stride.
//!
//! Loads settings from `~/.stride/config.toml` with the following precedence:
//! CLI arguments > Environment variables > Config file
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.stride/config.toml
//!
//! [catalogue]
//! # JSON, YAML or TOML shoe catalogue
//! path = "/path/to/catalogue.json"
//!
//! [scoring]
//! # Optional TOML scoring-table override
//! table = "/path/to/scoring.toml"
//!
//! [prose]
//! base_url = "https://api.anthropic.com/v1/"
//! model = "claude-3-5-haiku-latest"
//! timeout_ms = 8000
//! # Set to false to always use fallback bullets
//! enabled = true
//! ```
//!
//! The API key is only read from `STRIDE_PROSE_API_KEY`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CATALOGUE: &str = "STRIDE_CATALOGUE";
pub const ENV_SCORING_TABLE: &str = "STRIDE_SCORING_TABLE";
pub const ENV_PROSE_BASE_URL: &str = "STRIDE_PROSE_BASE_URL";
pub const ENV_PROSE_MODEL: &str = "STRIDE_PROSE_MODEL";
pub const ENV_PROSE_TIMEOUT_MS: &str = "STRIDE_PROSE_TIMEOUT_MS";
pub const ENV_PROSE_ENABLED: &str = "STRIDE_PROSE_ENABLED";

/// Top-level configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub prose: ProseSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogueConfig {
    /// Path to the shoe catalogue file.
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoringConfig {
    /// Path to a TOML scoring-table override.
    pub table: Option<String>,
}

/// Text-generation settings.
#[derive(Debug, Default, Deserialize)]
pub struct ProseSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_ms: Option<u64>,
    pub enabled: Option<bool>,
}

/// Returns the path to the config file (~/.stride/config.toml).
fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".stride").join("config.toml"))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists
/// but fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(
        target: "stride::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Applies configuration file settings to environment variables.
///
/// Only sets variables that are not already set, so the environment wins
/// over the file and clap's `env` fallbacks pick the result up. Call this
/// before parsing CLI arguments.
pub fn apply_config_to_env() {
    match load_config() {
        Ok(Some(config)) => apply(&config),
        Ok(None) => {}
        Err(e) => tracing::warn!(target: "stride::config", error = %e, "Ignoring invalid config file"),
    }
}

fn apply(config: &Config) {
    fn set_if_absent(key: &str, value: &str) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
            tracing::trace!(
                target: "stride::config",
                key,
                "Set environment variable from config file"
            );
        }
    }

    if let Some(ref path) = config.catalogue.path {
        set_if_absent(ENV_CATALOGUE, path);
    }
    if let Some(ref table) = config.scoring.table {
        set_if_absent(ENV_SCORING_TABLE, table);
    }
    if let Some(ref url) = config.prose.base_url {
        set_if_absent(ENV_PROSE_BASE_URL, url);
    }
    if let Some(ref model) = config.prose.model {
        set_if_absent(ENV_PROSE_MODEL, model);
    }
    if let Some(ms) = config.prose.timeout_ms {
        set_if_absent(ENV_PROSE_TIMEOUT_MS, &ms.to_string());
    }
    if let Some(enabled) = config.prose.enabled {
        set_if_absent(ENV_PROSE_ENABLED, if enabled { "true" } else { "false" });
    }
}

/// Whether text generation is switched on. Defaults to on.
pub fn prose_enabled() -> bool {
    std::env::var(ENV_PROSE_ENABLED)
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
        .unwrap_or(true)
}

/// Per-shoe budget for text generation, if configured.
pub fn prose_timeout() -> Option<Duration> {
    std::env::var(ENV_PROSE_TIMEOUT_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

pub fn scoring_table_path() -> Option<PathBuf> {
    std::env::var(ENV_SCORING_TABLE)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use stride_test_utils::set_env_var;

    #[test]
    fn config_path_returns_expected_location() {
        let path = config_path().unwrap();
        assert!(path.ends_with(".stride/config.toml"));
    }

    #[test]
    fn parse_minimal_config() {
        let config: Config = toml::from_str("[catalogue]\n").unwrap();
        assert!(config.catalogue.path.is_none());
        assert!(config.prose.enabled.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [catalogue]
            path = "/data/shoes.json"

            [scoring]
            table = "/data/scoring.toml"

            [prose]
            base_url = "https://llm.internal/v1"
            model = "small-model"
            timeout_ms = 2500
            enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalogue.path.as_deref(), Some("/data/shoes.json"));
        assert_eq!(config.scoring.table.as_deref(), Some("/data/scoring.toml"));
        assert_eq!(config.prose.model.as_deref(), Some("small-model"));
        assert_eq!(config.prose.timeout_ms, Some(2500));
        assert_eq!(config.prose.enabled, Some(false));
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[prose]\ntimeout_ms = \"soon\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    #[serial]
    fn env_wins_over_config_file() {
        let _catalogue = set_env_var(ENV_CATALOGUE, Some("/from/env.json"));
        let _model = set_env_var(ENV_PROSE_MODEL, None);
        let _enabled = set_env_var(ENV_PROSE_ENABLED, None);

        let config = Config {
            catalogue: CatalogueConfig {
                path: Some("/from/file.json".into()),
            },
            prose: ProseSettings {
                model: Some("file-model".into()),
                enabled: Some(false),
                ..ProseSettings::default()
            },
            ..Config::default()
        };
        apply(&config);

        assert_eq!(std::env::var(ENV_CATALOGUE).unwrap(), "/from/env.json");
        assert_eq!(std::env::var(ENV_PROSE_MODEL).unwrap(), "file-model");
        assert!(!prose_enabled());
    }

    #[test]
    #[serial]
    fn home_config_file_is_applied() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".stride")).unwrap();
        std::fs::write(
            home.path().join(".stride/config.toml"),
            "[scoring]\ntable = \"/tables/canonical.toml\"\n[prose]\ntimeout_ms = 1200\n",
        )
        .unwrap();
        let _home = set_env_var("HOME", home.path().to_str());
        let _table = set_env_var(ENV_SCORING_TABLE, None);
        let _timeout = set_env_var(ENV_PROSE_TIMEOUT_MS, None);

        apply_config_to_env();

        assert_eq!(
            scoring_table_path(),
            Some(PathBuf::from("/tables/canonical.toml"))
        );
        assert_eq!(prose_timeout(), Some(Duration::from_millis(1200)));
    }

    #[test]
    #[serial]
    fn prose_enabled_defaults_to_true() {
        let _enabled = set_env_var(ENV_PROSE_ENABLED, None);
        assert!(prose_enabled());
        let _off = set_env_var(ENV_PROSE_ENABLED, Some("off"));
        assert!(!prose_enabled());
    }
}
