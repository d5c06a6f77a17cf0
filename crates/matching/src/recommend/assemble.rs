//! Turns selections into display-ready recommendations.

use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use stride_catalogue::{CategoryFlags, FeelScores, PlateMaterial, PriceTier, ShoeRecord};

use super::comparative::comparative_claims;
use super::explainer::{fallback_bullets, normalize_bullets, BulletPrompt, BulletWriter};
use super::{ScoreBreakdown, Selection, SelectionRole};
use crate::preference::DropPreference;

/// Default per-call budget for the text generator.
pub const DEFAULT_BULLET_TIMEOUT: Duration = Duration::from_secs(8);

/// Minimum bucket distance from every preferred drop that forces a trade-off badge.
const DROP_TRADE_OFF_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    ClosestMatch,
    CloseMatch,
    TradeOff,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClosestMatch => "closest match",
            Self::CloseMatch => "close match",
            Self::TradeOff => "trade-off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletSource {
    Generated,
    Fallback,
}

/// The fields of a catalogue record a client needs to render a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoeView {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub version: Option<String>,
    pub display_name: String,
    pub categories: CategoryFlags,
    pub feel: FeelScores,
    pub weight_g: u32,
    pub heel_drop_mm: f32,
    pub plate: PlateMaterial,
    pub price_tier: PriceTier,
}

impl From<&ShoeRecord> for ShoeView {
    fn from(shoe: &ShoeRecord) -> Self {
        Self {
            id: shoe.id.clone(),
            brand: shoe.brand.clone(),
            model: shoe.model.clone(),
            version: shoe.version.clone(),
            display_name: shoe.display_name(),
            categories: shoe.categories,
            feel: shoe.feel,
            weight_g: shoe.specs.weight_g,
            heel_drop_mm: shoe.specs.heel_drop_mm,
            plate: shoe.specs.plate,
            price_tier: shoe.meta.price_tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedShoe {
    pub shoe: ShoeView,
    pub role: SelectionRole,
    pub badge: Badge,
    pub position: Position,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub strengths: Vec<String>,
    pub trade_offs: Vec<String>,
    pub bullets: Vec<String>,
    pub bullet_source: BulletSource,
}

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub bullet_timeout: Duration,
    /// Passed to the text generator as the runner's situation.
    pub reason: Option<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            bullet_timeout: DEFAULT_BULLET_TIMEOUT,
            reason: None,
        }
    }
}

fn badge_for(selection: &Selection<'_>, heel_drop: &DropPreference) -> Badge {
    let far_from_drop = heel_drop
        .best_distance(selection.candidate.shoe.specs.drop_bucket())
        .is_some_and(|d| d >= DROP_TRADE_OFF_DISTANCE);
    if far_from_drop {
        return Badge::TradeOff;
    }
    match selection.role {
        SelectionRole::Primary => Badge::ClosestMatch,
        SelectionRole::Similar => Badge::CloseMatch,
        SelectionRole::Contrast => Badge::TradeOff,
    }
}

/// Center goes to the first closest match, else the first shoe; the rest
/// fill left then right in selection order.
fn positions(badges: &[Badge]) -> Vec<Position> {
    let center = badges
        .iter()
        .position(|b| *b == Badge::ClosestMatch)
        .unwrap_or(0);
    let mut sides = [Position::Left, Position::Right].into_iter();
    (0..badges.len())
        .map(|i| {
            if i == center {
                Position::Center
            } else {
                sides.next().unwrap_or(Position::Right)
            }
        })
        .collect()
}

async fn bullets_for(
    writer: &dyn BulletWriter,
    prompt: &BulletPrompt,
    timeout: Duration,
) -> Option<[String; 3]> {
    match tokio::time::timeout(timeout, writer.write_bullets(prompt)).await {
        Ok(Ok(raw)) => {
            let count = raw.len();
            let bullets = normalize_bullets(raw);
            if bullets.is_none() {
                tracing::warn!(
                    target: "stride::prose",
                    shoe = %prompt.shoe_id,
                    count,
                    "Text generator returned malformed bullets, using fallback"
                );
            }
            bullets
        }
        Ok(Err(e)) => {
            tracing::warn!(target: "stride::prose", shoe = %prompt.shoe_id, error = %e, "Text generator failed, using fallback");
            None
        }
        Err(_) => {
            tracing::warn!(
                target: "stride::prose",
                shoe = %prompt.shoe_id,
                timeout_ms = timeout.as_millis() as u64,
                "Text generator timed out, using fallback"
            );
            None
        }
    }
}

/// Assigns badges and positions, computes comparative claims and fetches
/// bullets for every selection concurrently.
pub async fn assemble(
    selections: &[Selection<'_>],
    heel_drop: &DropPreference,
    writer: &dyn BulletWriter,
    options: &AssembleOptions,
) -> Vec<RecommendedShoe> {
    let shoes: Vec<&ShoeRecord> = selections.iter().map(|s| s.candidate.shoe).collect();
    let claims = comparative_claims(&shoes);
    let badges: Vec<Badge> = selections.iter().map(|s| badge_for(s, heel_drop)).collect();
    let positions = positions(&badges);

    let prompts: Vec<BulletPrompt> = selections
        .iter()
        .zip(&badges)
        .zip(&claims)
        .map(|((selection, badge), claim)| {
            let prompt = BulletPrompt::new(
                selection.candidate.shoe,
                badge.label(),
                &claim.strengths,
                &claim.trade_offs,
            );
            match &options.reason {
                Some(reason) => prompt.with_reason(reason.clone()),
                None => prompt,
            }
        })
        .collect();

    let generated = join_all(
        prompts
            .iter()
            .map(|prompt| bullets_for(writer, prompt, options.bullet_timeout)),
    )
    .await;

    selections
        .iter()
        .zip(claims)
        .zip(badges)
        .zip(positions)
        .zip(generated)
        .map(|((((selection, claim), badge), position), bullets)| {
            let shoe = selection.candidate.shoe;
            let (bullets, bullet_source) = match bullets {
                Some(bullets) => (bullets, BulletSource::Generated),
                None => (
                    fallback_bullets(shoe, &claim.strengths, &claim.trade_offs),
                    BulletSource::Fallback,
                ),
            };
            RecommendedShoe {
                shoe: ShoeView::from(shoe),
                role: selection.role,
                badge,
                position,
                score: selection.candidate.score,
                breakdown: selection.candidate.breakdown,
                strengths: claim.strengths,
                trade_offs: claim.trade_offs,
                bullets: bullets.to_vec(),
                bullet_source,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::ScoredCandidate;
    use anyhow::Result;
    use async_trait::async_trait;
    use stride_catalogue::DropBucket;
    use stride_test_utils::ShoeBuilder;

    struct FixedWriter(Vec<String>);

    #[async_trait]
    impl BulletWriter for FixedWriter {
        async fn write_bullets(&self, prompt: &BulletPrompt) -> Result<Vec<String>> {
            if prompt.shoe_id == "broken" {
                anyhow::bail!("boom");
            }
            Ok(self.0.clone())
        }
    }

    struct SlowWriter;

    #[async_trait]
    impl BulletWriter for SlowWriter {
        async fn write_bullets(&self, _prompt: &BulletPrompt) -> Result<Vec<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec!["a".into(), "b".into(), "c".into()])
        }
    }

    fn selection(shoe: &ShoeRecord, role: SelectionRole) -> Selection<'_> {
        Selection {
            candidate: ScoredCandidate::new(shoe, ScoreBreakdown::default()),
            role,
        }
    }

    #[test]
    fn test_positions_center_on_closest_match() {
        let p = positions(&[Badge::TradeOff, Badge::ClosestMatch, Badge::CloseMatch]);
        assert_eq!(p, vec![Position::Left, Position::Center, Position::Right]);

        let p = positions(&[Badge::TradeOff, Badge::CloseMatch, Badge::TradeOff]);
        assert_eq!(p, vec![Position::Center, Position::Left, Position::Right]);
    }

    #[test]
    fn test_far_drop_forces_trade_off() {
        let shoe = ShoeBuilder::new("x").daily().drop(10.0).build();
        let s = selection(&shoe, SelectionRole::Primary);
        let pref = DropPreference::Explicit(vec![DropBucket::Low]);
        assert_eq!(badge_for(&s, &pref), Badge::TradeOff);
        assert_eq!(badge_for(&s, &DropPreference::DecideForMe), Badge::ClosestMatch);
    }

    #[tokio::test]
    async fn test_failures_fall_back_independently() {
        let good = ShoeBuilder::new("good").daily().build();
        let broken = ShoeBuilder::new("broken").daily().build();
        let other = ShoeBuilder::new("other").daily().build();
        let selections = vec![
            selection(&good, SelectionRole::Primary),
            selection(&broken, SelectionRole::Similar),
            selection(&other, SelectionRole::Contrast),
        ];
        let writer = FixedWriter(vec!["one".into(), "two".into(), "three".into()]);
        let out = assemble(
            &selections,
            &DropPreference::DecideForMe,
            &writer,
            &AssembleOptions::default(),
        )
        .await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].bullet_source, BulletSource::Generated);
        assert_eq!(out[0].bullets, vec!["one", "two", "three"]);
        assert_eq!(out[1].bullet_source, BulletSource::Fallback);
        assert_eq!(out[1].bullets.len(), 3);
        assert_eq!(out[2].bullet_source, BulletSource::Generated);
        assert_eq!(out[0].position, Position::Center);
        assert_eq!(out[1].position, Position::Left);
        assert_eq!(out[2].position, Position::Right);
    }

    #[tokio::test]
    async fn test_malformed_output_falls_back() {
        let shoe = ShoeBuilder::new("x").daily().build();
        let selections = vec![selection(&shoe, SelectionRole::Primary)];
        let writer = FixedWriter(vec!["only one".into()]);
        let out = assemble(
            &selections,
            &DropPreference::DecideForMe,
            &writer,
            &AssembleOptions::default(),
        )
        .await;
        assert_eq!(out[0].bullet_source, BulletSource::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let shoe = ShoeBuilder::new("x").daily().build();
        let selections = vec![selection(&shoe, SelectionRole::Primary)];
        let options = AssembleOptions {
            bullet_timeout: Duration::from_millis(50),
            reason: None,
        };
        let out = assemble(&selections, &DropPreference::DecideForMe, &SlowWriter, &options).await;
        assert_eq!(out[0].bullet_source, BulletSource::Fallback);
    }
}
