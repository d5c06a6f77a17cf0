//! Pipeline façade tying analysis, gap detection, retrieval, selection and
//! assembly together.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stride_catalogue::{Catalogue, Category};

use crate::error::{MatchError, Result};
use crate::gap::{detect_gap, Gap};
use crate::preference::{DropPreference, FeelPreferences};
use crate::profile::{CurrentShoe, RunnerProfile};
use crate::recommend::assemble::DEFAULT_BULLET_TIMEOUT;
use crate::recommend::{
    assemble, retrieve, select_diverse, select_up_to, stability_need, summary_sentence,
    AssembleOptions, BulletWriter, Constraints, Position, RecommendedShoe, RelaxationStage,
    Retrieval, ScoringInputs, ShoeScorer,
};
use crate::rotation::{analyze_rotation, RotationAnalysis};
use crate::signals::ContextSignal;
use crate::table::ScoringTable;

/// Inputs for an analysis-mode recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisQuery {
    pub profile: RunnerProfile,
    pub current_shoes: Vec<CurrentShoe>,
    /// Detected from the rotation when absent.
    pub gap: Option<Gap>,
    pub feel: FeelPreferences,
    pub heel_drop: DropPreference,
    pub signals: Vec<ContextSignal>,
}

/// One category a runner wants to browse in discovery mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub category: Category,
    #[serde(default)]
    pub feel: FeelPreferences,
    #[serde(default)]
    pub heel_drop: DropPreference,
}

impl CategoryRequest {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            feel: FeelPreferences::default(),
            heel_drop: DropPreference::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryQuery {
    pub profile: RunnerProfile,
    pub current_shoes: Vec<CurrentShoe>,
    pub requests: Vec<CategoryRequest>,
    pub signals: Vec<ContextSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub gap: Gap,
    /// Always three distinct shoes.
    pub recommendations: Vec<RecommendedShoe>,
    pub summary: String,
    pub stage: RelaxationStage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryOutcome {
    pub category: Category,
    /// Up to three shoes; fewer only when the catalogue runs out.
    pub recommendations: Vec<RecommendedShoe>,
    pub reasoning: String,
    pub stage: RelaxationStage,
}

/// Ranked candidates for an analysis query, before selection.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub gap: Gap,
    pub analysis: RotationAnalysis,
    pub retrieval: Retrieval<'a>,
}

/// The matching pipeline with its injected scoring table.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    scorer: ShoeScorer,
    bullet_timeout: Duration,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(Arc::new(ScoringTable::default()))
    }
}

impl MatchEngine {
    pub fn new(table: Arc<ScoringTable>) -> Self {
        Self {
            scorer: ShoeScorer::new(table),
            bullet_timeout: DEFAULT_BULLET_TIMEOUT,
        }
    }

    /// Per-call budget for the text generator.
    pub fn with_bullet_timeout(mut self, timeout: Duration) -> Self {
        self.bullet_timeout = timeout;
        self
    }

    pub fn table(&self) -> &ScoringTable {
        self.scorer.table()
    }

    pub fn analyze(
        &self,
        catalogue: &Catalogue,
        current: &[CurrentShoe],
        profile: &RunnerProfile,
    ) -> RotationAnalysis {
        analyze_rotation(current, profile, catalogue)
    }

    /// Gap-detection mode.
    pub fn detect_gap(
        &self,
        catalogue: &Catalogue,
        current: &[CurrentShoe],
        profile: &RunnerProfile,
    ) -> Result<Gap> {
        ensure_catalogue(catalogue)?;
        let analysis = self.analyze(catalogue, current, profile);
        Ok(detect_gap(&analysis, profile))
    }

    /// Scores and ranks candidates for the query's gap without selecting.
    pub fn rank<'a>(&self, catalogue: &'a Catalogue, query: &AnalysisQuery) -> Result<Ranking<'a>> {
        ensure_catalogue(catalogue)?;
        let analysis = self.analyze(catalogue, &query.current_shoes, &query.profile);
        let gap = match &query.gap {
            Some(gap) => gap.clone(),
            None => detect_gap(&analysis, &query.profile),
        };

        let constraints = runner_constraints(
            gap.target_category,
            &query.feel,
            &query.heel_drop,
            &query.profile,
            &analysis,
            &query.signals,
        );
        let inputs = ScoringInputs {
            profile: &query.profile,
            analysis: &analysis,
            signals: &query.signals,
            contrast: gap.is_exploration(),
        };
        let retrieval = retrieve(
            catalogue,
            &constraints,
            &inputs,
            &self.scorer,
            &self.table().cutoffs,
        );
        Ok(Ranking {
            gap,
            analysis,
            retrieval,
        })
    }

    /// Analysis mode: exactly three recommendations for one gap.
    pub async fn recommend(
        &self,
        catalogue: &Catalogue,
        query: &AnalysisQuery,
        writer: &dyn BulletWriter,
    ) -> Result<AnalysisOutcome> {
        let ranking = self.rank(catalogue, query)?;
        let selections = select_diverse(&ranking.retrieval.candidates)?;
        let options = AssembleOptions {
            bullet_timeout: self.bullet_timeout,
            reason: Some(ranking.gap.rationale.clone()),
        };
        let recommendations = assemble(&selections, &query.heel_drop, writer, &options).await;

        let center = recommendations
            .iter()
            .position(|r| r.position == Position::Center)
            .unwrap_or(0);
        let summary = summary_sentence(&ranking.gap, selections[center].candidate.shoe);

        tracing::info!(
            target: "stride::engine",
            gap = ranking.gap.kind.label(),
            target = %ranking.gap.target_category,
            stage = ?ranking.retrieval.stage,
            "Assembled analysis recommendations"
        );
        Ok(AnalysisOutcome {
            gap: ranking.gap,
            recommendations,
            summary,
            stage: ranking.retrieval.stage,
        })
    }

    /// Discovery mode: up to three recommendations per requested category.
    ///
    /// A category with no candidates at all fails the whole request.
    pub async fn discover(
        &self,
        catalogue: &Catalogue,
        query: &DiscoveryQuery,
        writer: &dyn BulletWriter,
    ) -> Result<Vec<DiscoveryOutcome>> {
        ensure_catalogue(catalogue)?;
        let analysis = self.analyze(catalogue, &query.current_shoes, &query.profile);
        let mut outcomes = Vec::with_capacity(query.requests.len());

        for request in &query.requests {
            let constraints = runner_constraints(
                request.category,
                &request.feel,
                &request.heel_drop,
                &query.profile,
                &analysis,
                &query.signals,
            );
            let inputs = ScoringInputs {
                profile: &query.profile,
                analysis: &analysis,
                signals: &query.signals,
                contrast: false,
            };
            let retrieval = retrieve(
                catalogue,
                &constraints,
                &inputs,
                &self.scorer,
                &self.table().cutoffs,
            );
            let selections = select_up_to(&retrieval.candidates, 3);
            if selections.is_empty() {
                return Err(MatchError::InsufficientCandidates {
                    found: 0,
                    required: 1,
                });
            }

            let reasoning = discovery_reasoning(request.category, retrieval.stage, selections.len());
            let options = AssembleOptions {
                bullet_timeout: self.bullet_timeout,
                reason: Some(reasoning.clone()),
            };
            let recommendations =
                assemble(&selections, &request.heel_drop, writer, &options).await;
            tracing::info!(
                target: "stride::engine",
                category = %request.category,
                stage = ?retrieval.stage,
                count = recommendations.len(),
                "Assembled discovery recommendations"
            );
            outcomes.push(DiscoveryOutcome {
                category: request.category,
                recommendations,
                reasoning,
                stage: retrieval.stage,
            });
        }

        Ok(outcomes)
    }
}

fn ensure_catalogue(catalogue: &Catalogue) -> Result<()> {
    if catalogue.is_empty() {
        return Err(MatchError::EmptyCatalogue);
    }
    Ok(())
}

fn runner_constraints(
    category: Category,
    feel: &FeelPreferences,
    heel_drop: &DropPreference,
    profile: &RunnerProfile,
    analysis: &RotationAnalysis,
    signals: &[ContextSignal],
) -> Constraints {
    Constraints::for_category(category)
        .with_feel(*feel)
        .with_heel_drop(heel_drop.clone())
        .excluding(analysis.owned_ids.iter().cloned())
        .for_runner(profile)
        .with_stability_need(stability_need(feel, analysis, signals))
}

fn discovery_reasoning(category: Category, stage: RelaxationStage, shown: usize) -> String {
    let mut text = format!("Best {category} matches for your profile and preferences.");
    match stage {
        RelaxationStage::Strict => {}
        RelaxationStage::WidenedCategories => {
            text.push_str(" Few dedicated shoes matched, so neighbouring categories were included.")
        }
        RelaxationStage::DroppedPreferences => {
            text.push_str(" Your feel and heel-drop preferences were relaxed to find enough options.")
        }
        RelaxationStage::Fallback => {
            text.push_str(" Few shoes matched, so versatile all-rounders fill the remaining slots.")
        }
    }
    if shown < 3 {
        text.push_str(&format!(" Only {shown} distinct shoes are available for this request."));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::GapKind;
    use crate::recommend::OfflineWriter;
    use stride_test_utils::{catalogue_of, ShoeBuilder};

    fn daily_catalogue() -> Catalogue {
        catalogue_of(vec![
            ShoeBuilder::new("d1").daily().weight(240).build(),
            ShoeBuilder::new("d2").daily().weight(260).build(),
            ShoeBuilder::new("d3").daily().weight(300).feel([5, 5, 3, 3, 3, 4]).build(),
            ShoeBuilder::new("r1").race().weight(190).build(),
        ])
    }

    #[test]
    fn test_rank_uses_detected_gap() {
        let catalogue = daily_catalogue();
        let engine = MatchEngine::default();
        let ranking = engine.rank(&catalogue, &AnalysisQuery::default()).unwrap();
        assert!(matches!(ranking.gap.kind, GapKind::Coverage { .. }));
        assert_eq!(ranking.gap.target_category, Category::Daily);
        assert_eq!(ranking.retrieval.stage, RelaxationStage::Strict);
        assert!(ranking.retrieval.candidates.iter().all(|c| c.id() != "r1"));
    }

    #[tokio::test]
    async fn test_recommend_returns_three_with_summary() {
        let catalogue = daily_catalogue();
        let engine = MatchEngine::default();
        let outcome = engine
            .recommend(&catalogue, &AnalysisQuery::default(), &OfflineWriter)
            .await
            .unwrap();
        assert_eq!(outcome.recommendations.len(), 3);
        assert!(outcome.summary.contains("closest match"));
        let centers = outcome
            .recommendations
            .iter()
            .filter(|r| r.position == Position::Center)
            .count();
        assert_eq!(centers, 1);
    }

    #[tokio::test]
    async fn test_discover_degrades_to_fewer_results() {
        let catalogue = catalogue_of(vec![
            ShoeBuilder::new("t1").trail().build(),
            ShoeBuilder::new("d1").daily().build(),
        ]);
        let query = DiscoveryQuery {
            requests: vec![CategoryRequest::new(Category::Trail)],
            ..DiscoveryQuery::default()
        };
        let outcomes = MatchEngine::default()
            .discover(&catalogue, &query, &OfflineWriter)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].recommendations.len(), 1);
        assert!(outcomes[0].reasoning.contains("Only 1 distinct"));
    }

    #[tokio::test]
    async fn test_discover_with_nothing_left_is_an_error() {
        let catalogue = catalogue_of(vec![ShoeBuilder::new("d1").daily().build()]);
        let query = DiscoveryQuery {
            requests: vec![CategoryRequest::new(Category::Trail)],
            ..DiscoveryQuery::default()
        };
        let err = MatchEngine::default()
            .discover(&catalogue, &query, &OfflineWriter)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MatchError::InsufficientCandidates {
                found: 0,
                required: 1
            }
        );
    }

    #[test]
    fn test_reasoning_mentions_relaxation() {
        let text = discovery_reasoning(Category::Race, RelaxationStage::WidenedCategories, 3);
        assert!(text.starts_with("Best race matches"));
        assert!(text.contains("neighbouring"));
    }
}
