//! Prose for recommendations: the text-generation seam, deterministic
//! fallback bullets and the analysis summary.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use stride_catalogue::{FeelDimension, ShoeRecord};

use crate::gap::Gap;

/// Number of bullets every recommended shoe carries.
pub const BULLET_COUNT: usize = 3;

/// Everything a text generator needs to describe one shoe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletPrompt {
    pub shoe_id: String,
    pub shoe_name: String,
    pub badge: String,
    pub categories: Vec<String>,
    pub feel_summary: String,
    pub weight_g: u32,
    pub heel_drop_mm: f32,
    pub strengths: Vec<String>,
    pub trade_offs: Vec<String>,
    pub feel_notes: String,
    pub who_its_for: String,
    pub notable_detail: String,
    pub common_issues: Vec<String>,
    /// Why the runner is being shown this shoe at all.
    pub reason: Option<String>,
}

impl BulletPrompt {
    pub fn new(shoe: &ShoeRecord, badge: &str, strengths: &[String], trade_offs: &[String]) -> Self {
        Self {
            shoe_id: shoe.id.clone(),
            shoe_name: shoe.display_name(),
            badge: badge.to_string(),
            categories: shoe
                .categories
                .categories()
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            feel_summary: feel_summary(shoe),
            weight_g: shoe.specs.weight_g,
            heel_drop_mm: shoe.specs.heel_drop_mm,
            strengths: strengths.to_vec(),
            trade_offs: trade_offs.to_vec(),
            feel_notes: shoe.descriptions.feel_notes.clone(),
            who_its_for: shoe.descriptions.who_its_for.clone(),
            notable_detail: shoe.descriptions.notable_detail.clone(),
            common_issues: shoe.descriptions.common_issues.clone(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Plain-text prompt for a chat-style text generator.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "Write exactly {} short bullet points, one per line and each starting with \"- \", \
                 explaining why a runner might choose the {}.",
                BULLET_COUNT, self.shoe_name
            ),
            "Use only the facts below. Do not mention prices or invent specifications.".to_string(),
            String::new(),
            format!("Shoe: {}", self.shoe_name),
            format!("Shown as: {}", self.badge),
            format!("Categories: {}", self.categories.join(", ")),
            format!("Feel: {}", self.feel_summary),
            format!(
                "Specs: {} g, {} mm heel drop",
                self.weight_g, self.heel_drop_mm
            ),
        ];
        let optional = [
            ("Compared with the other picks", self.strengths.join("; ")),
            ("Trade-offs", self.trade_offs.join("; ")),
            ("Feel notes", self.feel_notes.clone()),
            ("Who it's for", self.who_its_for.clone()),
            ("Notable detail", self.notable_detail.clone()),
            ("Common issues", self.common_issues.join("; ")),
            ("Runner's situation", self.reason.clone().unwrap_or_default()),
        ];
        for (label, value) in optional {
            if !value.trim().is_empty() {
                lines.push(format!("{label}: {value}"));
            }
        }
        lines.join("\n")
    }
}

/// External text generator producing bullets for one shoe.
#[async_trait]
pub trait BulletWriter: Send + Sync {
    /// Returns the raw bullets. Callers validate the count.
    async fn write_bullets(&self, prompt: &BulletPrompt) -> Result<Vec<String>>;
}

/// Writer that never calls out; every shoe gets fallback bullets.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineWriter;

#[async_trait]
impl BulletWriter for OfflineWriter {
    async fn write_bullets(&self, _prompt: &BulletPrompt) -> Result<Vec<String>> {
        bail!("text generation disabled")
    }
}

/// Trims bullets and accepts them only if exactly three are non-empty.
pub fn normalize_bullets(raw: Vec<String>) -> Option<[String; BULLET_COUNT]> {
    let cleaned: Vec<String> = raw
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    cleaned.try_into().ok()
}

fn level_word(value: u8) -> &'static str {
    match value {
        0..=1 => "very low",
        2 => "low",
        3 => "moderate",
        4 => "high",
        _ => "very high",
    }
}

fn feel_summary(shoe: &ShoeRecord) -> String {
    FeelDimension::ALL
        .into_iter()
        .map(|d| format!("{} {}", d.label(), level_word(shoe.feel.get(d))))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sentence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.ends_with(['.', '!', '?']) {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}

/// Deterministic bullets built from the shoe's own descriptive fields.
pub fn fallback_bullets(
    shoe: &ShoeRecord,
    strengths: &[String],
    trade_offs: &[String],
) -> [String; BULLET_COUNT] {
    let d = &shoe.descriptions;
    let feel = &shoe.feel;

    let first = if d.feel_notes.trim().is_empty() {
        format!(
            "Rides with {} cushioning and {} bounce.",
            level_word(feel.cushion),
            level_word(feel.bounce)
        )
    } else {
        sentence(&d.feel_notes)
    };

    let second = if d.who_its_for.trim().is_empty() {
        let categories: Vec<&str> = shoe
            .categories
            .categories()
            .iter()
            .map(|c| c.label())
            .collect();
        if categories.is_empty() {
            "A versatile option for everyday running.".to_string()
        } else {
            format!("Built for {} running.", categories.join(" and "))
        }
    } else {
        sentence(&d.who_its_for)
    };

    let third = if !d.notable_detail.trim().is_empty() {
        sentence(&d.notable_detail)
    } else if let Some(strength) = strengths.first() {
        format!(
            "{} at {} g with a {} mm drop.",
            strength, shoe.specs.weight_g, shoe.specs.heel_drop_mm
        )
    } else if let Some(trade_off) = trade_offs.first() {
        format!(
            "{} at {} g, with a {} mm drop.",
            trade_off, shoe.specs.weight_g, shoe.specs.heel_drop_mm
        )
    } else {
        format!(
            "Weighs {} g with a {} mm heel drop.",
            shoe.specs.weight_g, shoe.specs.heel_drop_mm
        )
    };

    [first, second, third]
}

/// One-sentence summary for an analysis-mode response.
pub fn summary_sentence(gap: &Gap, center: &ShoeRecord) -> String {
    format!(
        "{} The {} is the closest match for that {} gap.",
        sentence(&gap.rationale),
        center.display_name(),
        gap.target_category
    )
}
