use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

/// Environment prefix for the text-generation settings.
pub const ENV_PREFIX: &str = "STRIDE_PROSE";
pub const DEFAULT_BASE: &str = "https://api.anthropic.com/v1/";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_MAX_TOKENS: u32 = 400;

#[derive(Debug, Clone)]
pub struct ProseConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl ProseConfig {
    /// Reads `{prefix}_API_KEY` (required), `{prefix}_BASE_URL`,
    /// `{prefix}_MODEL` and `{prefix}_TIMEOUT_MS`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let key_var = format!("{prefix}_API_KEY");
        let api_key = std::env::var(&key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{key_var} must be set for text generation"))?;

        let base_var = format!("{prefix}_BASE_URL");
        let base = std::env::var(&base_var).unwrap_or_else(|_| DEFAULT_BASE.to_string());
        let base_url = parse_base_url(&base).with_context(|| format!("invalid {base_var} url: {base}"))?;

        let model_var = format!("{prefix}_MODEL");
        let model = std::env::var(&model_var).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_var = format!("{prefix}_TIMEOUT_MS");
        let timeout_ms = std::env::var(&timeout_var)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_millis(timeout_ms),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// [`ProseConfig::from_env`] with the `STRIDE_PROSE` prefix.
    pub fn from_default_env() -> Result<Self> {
        Self::from_env(ENV_PREFIX)
    }
}

/// Parses a base URL, making sure its path ends in `/` so relative joins
/// keep every segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
