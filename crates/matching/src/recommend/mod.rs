//! Candidate retrieval, scoring, selection and assembly.

pub mod assemble;
pub mod comparative;
pub mod explainer;
mod filter;
mod relax;
mod scorer;
mod select;

pub use assemble::{
    assemble, AssembleOptions, Badge, BulletSource, Position, RecommendedShoe, ShoeView,
};
pub use comparative::{comparative_claims, Claim, ClaimSet};
pub use explainer::{
    fallback_bullets, normalize_bullets, summary_sentence, BulletPrompt, BulletWriter,
    OfflineWriter,
};
pub use filter::{passes_hard_filters, Exclusion};
pub use relax::{retrieve, widen_category, RelaxationStage, Retrieval};
pub use scorer::{Scorer, ShoeScorer};
pub use select::{select_diverse, select_up_to, Selection, SelectionRole};

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use stride_catalogue::{Category, FeelDimension, ShoeRecord};

use crate::preference::{DropPreference, FeelPreferences, Preference};
use crate::profile::{BrandFilter, DislikedTrait, LovedTrait, RunnerProfile};
use crate::rotation::RotationAnalysis;
use crate::signals::{ContextSignal, ExplicitRequest};

/// Points contributed by each modifier family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub category: f64,
    pub feel: f64,
    pub heel_drop: f64,
    pub stability: f64,
    pub availability: f64,
    pub versatility: f64,
    pub profile: f64,
    pub rotation: f64,
    pub context: f64,
    pub contrast: f64,
}

impl ScoreBreakdown {
    /// Raw sum of every family, before the zero floor.
    pub fn total(&self) -> f64 {
        self.category
            + self.feel
            + self.heel_drop
            + self.stability
            + self.availability
            + self.versatility
            + self.profile
            + self.rotation
            + self.context
            + self.contrast
    }
}

/// A catalogue shoe with its score. Borrows the record from the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub shoe: &'a ShoeRecord,
    /// `max(breakdown.total(), 0)`.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(shoe: &'a ShoeRecord, breakdown: ScoreBreakdown) -> Self {
        Self {
            shoe,
            score: breakdown.total().max(0.0),
            breakdown,
        }
    }

    pub fn id(&self) -> &'a str {
        &self.shoe.id
    }
}

/// Score descending, then id ascending.
pub fn compare_candidates(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.shoe.id.cmp(&b.shoe.id))
}

/// Sorts candidates into their final ranking order.
pub fn rank_candidates(candidates: &mut [ScoredCandidate<'_>]) {
    candidates.sort_by(compare_candidates);
}

/// What a single retrieval pass is looking for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Requested categories; the first one picks the feel archetype.
    pub categories: Vec<Category>,
    pub feel: FeelPreferences,
    pub heel_drop: DropPreference,
    pub stability_need: bool,
    /// Ids that must never be recommended, usually the current rotation.
    pub excluded_ids: BTreeSet<String>,
    pub brands: Option<BrandFilter>,
    pub exclude_carbon: bool,
}

impl Constraints {
    pub fn for_category(category: Category) -> Self {
        Self {
            categories: vec![category],
            ..Self::default()
        }
    }

    pub fn with_feel(mut self, feel: FeelPreferences) -> Self {
        self.feel = feel;
        self
    }

    pub fn with_heel_drop(mut self, heel_drop: DropPreference) -> Self {
        self.heel_drop = heel_drop;
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.excluded_ids.extend(ids);
        self
    }

    /// Applies the profile-level hard constraints: brand list and the
    /// beginner carbon exclusion.
    pub fn for_runner(mut self, profile: &RunnerProfile) -> Self {
        self.brands = profile.brands.clone();
        self.exclude_carbon = profile.is_beginner();
        self
    }

    pub fn with_stability_need(mut self, need: bool) -> Self {
        self.stability_need = need;
        self
    }

    /// The category whose archetype drives decide-for-me feel scoring.
    pub fn archetype_category(&self) -> Category {
        self.categories
            .first()
            .copied()
            .unwrap_or(Category::DEFAULT_VERSATILE)
    }

    pub fn wants_trail(&self) -> bool {
        self.categories.contains(&Category::Trail)
    }
}

/// Runner-side inputs shared by every candidate in a pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub profile: &'a RunnerProfile,
    pub analysis: &'a RotationAnalysis,
    pub signals: &'a [ContextSignal],
    /// Reward shoes that feel different from the current rotation.
    pub contrast: bool,
}

/// Whether anything in the request asks for a supportive shoe.
pub fn stability_need(
    feel: &FeelPreferences,
    analysis: &RotationAnalysis,
    signals: &[ContextSignal],
) -> bool {
    let explicit = matches!(feel.get(FeelDimension::Stability), Preference::Explicit(v) if v >= 4);
    let asked = signals.iter().any(|s| {
        matches!(
            s,
            ContextSignal::Request {
                request: ExplicitRequest::MoreStable
            }
        )
    });
    explicit
        || asked
        || analysis.loved.contains(&LovedTrait::Stable)
        || analysis.disliked.contains(&DislikedTrait::Unstable)
}
