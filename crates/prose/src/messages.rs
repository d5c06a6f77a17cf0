use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use stride_matching::recommend::explainer::BULLET_COUNT;
use stride_matching::{BulletPrompt, BulletWriter};

use crate::config::ProseConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const SYSTEM_PROMPT: &str = "You write short, factual running-shoe notes for a recommendation card. \
Answer with bullet points only.";

/// [`BulletWriter`] backed by an Anthropic-style messages endpoint.
#[derive(Debug, Clone)]
pub struct MessagesWriter {
    config: ProseConfig,
    client: reqwest::Client,
}

impl MessagesWriter {
    pub fn with_config(config: ProseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Builds a writer from the `STRIDE_PROSE_*` environment.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ProseConfig::from_default_env()?)
    }

    pub fn config(&self) -> &ProseConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self
            .config
            .base_url
            .join("messages")
            .unwrap_or_else(|_| self.config.base_url.clone());
        let body = build_body(&self.config.model, self.config.max_tokens, prompt);

        tracing::debug!(target: "stride::prose", url = %url, model = %self.config.model, "Requesting bullets");
        let resp = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("calling text-generation API")?;

        let status = resp.status();
        let text = resp.text().await?;
        let parsed: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));

        if !status.is_success() {
            let msg = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("text generation failed")
                .to_string();
            return Err(anyhow!("{msg} (HTTP {})", status.as_u16()));
        }

        extract_text(&parsed).ok_or_else(|| anyhow!("response carried no text content"))
    }
}

#[async_trait]
impl BulletWriter for MessagesWriter {
    async fn write_bullets(&self, prompt: &BulletPrompt) -> Result<Vec<String>> {
        let text = self.complete(&prompt.render()).await?;
        let bullets = parse_bullets(&text);
        if bullets.len() != BULLET_COUNT {
            bail!(
                "expected {BULLET_COUNT} bullets for {}, got {}",
                prompt.shoe_id,
                bullets.len()
            );
        }
        tracing::debug!(target: "stride::prose", shoe = %prompt.shoe_id, "Received bullets");
        Ok(bullets)
    }
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesBody {
    model: String,
    system: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

fn build_body(model: &str, max_tokens: u32, prompt: &str) -> MessagesBody {
    MessagesBody {
        model: model.to_string(),
        system: SYSTEM_PROMPT.to_string(),
        messages: vec![Message {
            role: "user".into(),
            content: prompt.to_string(),
        }],
        max_tokens,
    }
}

fn extract_text(val: &Value) -> Option<String> {
    val.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| {
            let buf: String = arr
                .iter()
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .collect();
            (!buf.is_empty()).then_some(buf)
        })
        .or_else(|| {
            val.get("content")
                .and_then(|c| c.as_str())
                .map(|s| s.to_string())
        })
}

/// Strips a `-`, `*`, `•` or `1.` / `1)` marker followed by whitespace.
fn strip_marker(line: &str) -> Option<&str> {
    let rest = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        rest
    } else {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        line[digits..].strip_prefix(['.', ')'])?
    };
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// Pulls bullet lines out of generated text.
///
/// Marked lines win; unmarked preamble is dropped. Text without any markers
/// falls back to its non-empty lines.
pub fn parse_bullets(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let marked: Vec<String> = lines
        .iter()
        .filter_map(|l| strip_marker(l))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if marked.is_empty() {
        lines.into_iter().map(str::to_string).collect()
    } else {
        marked
    }
}
