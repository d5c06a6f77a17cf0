//! Multi-factor additive scoring.

use std::sync::Arc;

use stride_catalogue::{
    Category, DropBucket, FeelDimension, PriceTier, ReleaseStatus, ShoeRecord, Support, ToeBox,
    Volume, WetGrip,
};

use super::{Constraints, ScoreBreakdown, ScoredCandidate, ScoringInputs};
use crate::preference::Preference;
use crate::profile::{
    BmiBand, DislikedTrait, Experience, FootStrike, LovedTrait, PaceBucket, PrimaryGoal,
    RunnerProfile, Sentiment, TrainingPattern,
};
use crate::rotation::RotationAnalysis;
use crate::signals::{Climate, ContextSignal, ExplicitRequest, FitIssue, Injury};
use crate::table::ScoringTable;

/// Trait for computing candidate scores.
pub trait Scorer {
    /// Score one catalogue shoe against the constraints and runner inputs.
    fn score<'a>(
        &self,
        shoe: &'a ShoeRecord,
        constraints: &Constraints,
        inputs: &ScoringInputs<'_>,
    ) -> ScoredCandidate<'a>;
}

/// Scorer driven entirely by an injected [`ScoringTable`].
#[derive(Debug, Clone, Default)]
pub struct ShoeScorer {
    table: Arc<ScoringTable>,
}

impl ShoeScorer {
    pub fn new(table: Arc<ScoringTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    fn category_points(&self, shoe: &ShoeRecord, constraints: &Constraints) -> f64 {
        let points = &self.table.categories;
        let sum: f64 = constraints
            .categories
            .iter()
            .filter(|c| shoe.categories.satisfies(**c))
            .map(|c| points.get(*c))
            .sum();
        sum.min(points.cap)
    }

    fn feel_points(&self, shoe: &ShoeRecord, constraints: &Constraints) -> f64 {
        let feel = &self.table.feel;
        let archetype = self.table.archetypes.get(constraints.archetype_category());

        FeelDimension::ALL
            .into_iter()
            .map(|dimension| {
                let value = shoe.feel.get(dimension);
                match constraints.feel.get(dimension) {
                    Preference::Explicit(target) => {
                        curve_at(&feel.explicit_curve, usize::from(value.abs_diff(target)))
                    }
                    Preference::DecideForMe => {
                        let range = archetype.get(dimension);
                        if range.contains(value) {
                            feel.in_range
                        } else {
                            -feel.per_unit_outside * f64::from(range.distance(value))
                        }
                    }
                    Preference::Ignore => 0.0,
                }
            })
            .sum()
    }

    fn heel_drop_points(&self, shoe: &ShoeRecord, constraints: &Constraints) -> f64 {
        constraints
            .heel_drop
            .best_distance(shoe.specs.drop_bucket())
            .map(|d| curve_at(&self.table.bonuses.drop_curve, d))
            .unwrap_or(0.0)
    }

    fn stability_points(&self, shoe: &ShoeRecord, constraints: &Constraints) -> f64 {
        if !constraints.stability_need {
            return 0.0;
        }
        match shoe.fit.support {
            Support::Neutral => 0.0,
            Support::Stability => self.table.bonuses.stability_support,
            Support::MaxStability => self.table.bonuses.max_stability_support,
        }
    }

    fn availability_points(&self, shoe: &ShoeRecord) -> f64 {
        match shoe.meta.release {
            ReleaseStatus::New => self.table.bonuses.release_new,
            ReleaseStatus::Available => self.table.bonuses.release_available,
            ReleaseStatus::Limited | ReleaseStatus::Discontinued => 0.0,
        }
    }

    fn versatility_points(&self, shoe: &ShoeRecord, constraints: &Constraints) -> f64 {
        if shoe.categories.super_versatile && constraints.categories.contains(&Category::Daily) {
            self.table.bonuses.super_versatile
        } else {
            0.0
        }
    }

    fn profile_points(&self, shoe: &ShoeRecord, profile: &RunnerProfile) -> f64 {
        let m = &self.table.profile;
        let feel = &shoe.feel;
        let plated = shoe.specs.plate.is_present();
        let bucket = shoe.specs.drop_bucket();
        let mut points = 0.0;

        match profile.experience {
            Experience::Beginner => {
                if plated {
                    points += m.beginner_plate;
                }
                if feel.stability >= 4 {
                    points += m.beginner_stable;
                }
            }
            Experience::Competitive => {
                if plated && (shoe.categories.race || shoe.categories.workout) {
                    points += m.competitive_plate;
                }
            }
            Experience::Intermediate | Experience::Experienced => {}
        }

        match profile.primary_goal {
            PrimaryGoal::GetFaster | PrimaryGoal::TrainForRace if feel.bounce >= 4 => {
                points += m.faster_bounce;
            }
            PrimaryGoal::InjuryRecovery => {
                if feel.cushion >= 4 {
                    points += m.injury_cushion;
                }
                if feel.stability >= 4 {
                    points += m.injury_stable;
                }
            }
            _ => {}
        }

        match profile.training_pattern {
            TrainingPattern::Infrequent if shoe.categories.super_versatile || shoe.categories.daily => {
                points += m.infrequent_versatile;
            }
            TrainingPattern::WorkoutFocused if feel.bounce >= 4 && feel.weight_feel <= 3 => {
                points += m.workout_focused_responsive;
            }
            _ => {}
        }

        match profile.pace_bucket() {
            Some(PaceBucket::Fast | PaceBucket::Quick) if feel.weight_feel <= 2 => {
                points += m.fast_pace_light;
            }
            Some(PaceBucket::Relaxed) if feel.cushion >= 4 => {
                points += m.relaxed_pace_cushion;
            }
            _ => {}
        }

        if profile.bmi_band() == Some(BmiBand::High) {
            if feel.cushion >= 4 {
                points += m.high_bmi_cushion;
            } else if feel.cushion <= 2 {
                points += m.high_bmi_firm;
            }
        }

        match profile.foot_strike {
            Some(FootStrike::Heel) if bucket >= DropBucket::Medium => points += m.heel_strike_drop,
            Some(FootStrike::Fore) if bucket <= DropBucket::Low => points += m.forefoot_low_drop,
            _ => {}
        }

        if profile.trails_regularly() && shoe.categories.trail && shoe.meta.wet_grip == WetGrip::Good {
            points += m.trail_grip;
        }

        points
    }

    fn rotation_points(&self, shoe: &ShoeRecord, analysis: &RotationAnalysis) -> f64 {
        let m = &self.table.rotation;
        let loved = analysis
            .loved
            .iter()
            .filter(|t| has_loved_trait(shoe, **t))
            .count() as f64;
        let disliked = analysis
            .disliked
            .iter()
            .filter(|t| has_disliked_trait(shoe, **t))
            .count() as f64;
        (loved * m.loved_trait + disliked * m.disliked_trait).clamp(-m.cap, m.cap)
    }

    fn context_points(&self, shoe: &ShoeRecord, signals: &[ContextSignal]) -> f64 {
        let m = &self.table.context;
        let feel = &shoe.feel;
        let bucket = shoe.specs.drop_bucket();

        signals
            .iter()
            .map(|signal| match signal {
                ContextSignal::Injury { injury } => {
                    let (good, bad) = match injury {
                        Injury::Achilles => (bucket >= DropBucket::Medium, bucket <= DropBucket::Low),
                        Injury::Knee => (feel.cushion >= 4, feel.cushion <= 2),
                        Injury::Shin => (feel.cushion >= 4, feel.ground_feel >= 4),
                        Injury::PlantarFascia => (
                            feel.stability >= 4 || feel.rocker >= 4,
                            feel.cushion <= 2,
                        ),
                    };
                    match_points(good, bad, m.injury_match, m.injury_mismatch)
                }
                ContextSignal::Fit { issue } => {
                    let (good, bad) = match issue {
                        FitIssue::TightToeBox => (
                            shoe.fit.toe_box == ToeBox::Roomy,
                            shoe.fit.toe_box == ToeBox::Narrow,
                        ),
                        FitIssue::WideFeet => (
                            shoe.fit.offers_wide(),
                            !shoe.fit.offers_wide() && shoe.fit.toe_box == ToeBox::Narrow,
                        ),
                        FitIssue::HeelSlip => (
                            shoe.fit.volume == Volume::Low,
                            shoe.fit.volume == Volume::High,
                        ),
                    };
                    match_points(good, bad, m.fit_match, m.fit_mismatch)
                }
                ContextSignal::Climate { climate } => {
                    let (good, bad) = match climate {
                        Climate::Wet => (
                            shoe.meta.wet_grip == WetGrip::Good,
                            shoe.meta.wet_grip == WetGrip::Poor,
                        ),
                        Climate::Hot => (feel.weight_feel <= 2, feel.weight_feel >= 4),
                        Climate::Cold => (shoe.meta.wet_grip == WetGrip::Good, false),
                    };
                    match_points(good, bad, m.climate_match, m.climate_mismatch)
                }
                ContextSignal::Request { request } => {
                    let satisfied = match request {
                        ExplicitRequest::Lighter => feel.weight_feel <= 2,
                        ExplicitRequest::Softer => feel.cushion >= 4,
                        ExplicitRequest::MoreStable => feel.stability >= 4,
                        ExplicitRequest::Bouncier => feel.bounce >= 4,
                        ExplicitRequest::LowerDrop => bucket <= DropBucket::Low,
                        ExplicitRequest::Cheaper => shoe.meta.price_tier == PriceTier::Budget,
                    };
                    if satisfied {
                        m.request_match
                    } else {
                        0.0
                    }
                }
                ContextSignal::PastShoe { brand, sentiment } => {
                    if !brand.eq_ignore_ascii_case(&shoe.brand) {
                        return 0.0;
                    }
                    match sentiment {
                        Sentiment::Positive => m.brand_positive,
                        Sentiment::Negative => m.brand_negative,
                        Sentiment::Neutral => 0.0,
                    }
                }
            })
            .sum()
    }

    fn contrast_points(&self, shoe: &ShoeRecord, inputs: &ScoringInputs<'_>) -> f64 {
        if !inputs.contrast {
            return 0.0;
        }
        let Some(average) = inputs.analysis.average_feel else {
            return 0.0;
        };
        let spread: f64 = FeelDimension::ALL
            .into_iter()
            .map(|d| (f64::from(shoe.feel.get(d)) - average.get(d)).abs())
            .sum();
        let bonuses = &self.table.bonuses;
        (bonuses.contrast_factor * spread).min(bonuses.contrast_cap)
    }
}

impl Scorer for ShoeScorer {
    fn score<'a>(
        &self,
        shoe: &'a ShoeRecord,
        constraints: &Constraints,
        inputs: &ScoringInputs<'_>,
    ) -> ScoredCandidate<'a> {
        let breakdown = ScoreBreakdown {
            category: self.category_points(shoe, constraints),
            feel: self.feel_points(shoe, constraints),
            heel_drop: self.heel_drop_points(shoe, constraints),
            stability: self.stability_points(shoe, constraints),
            availability: self.availability_points(shoe),
            versatility: self.versatility_points(shoe, constraints),
            profile: self.profile_points(shoe, inputs.profile),
            rotation: self.rotation_points(shoe, inputs.analysis),
            context: self.context_points(shoe, inputs.signals),
            contrast: self.contrast_points(shoe, inputs),
        };
        ScoredCandidate::new(shoe, breakdown)
    }
}

/// Curve lookup; distances past the end reuse the last entry.
fn curve_at(curve: &[f64; 5], distance: usize) -> f64 {
    curve[distance.min(curve.len() - 1)]
}

fn match_points(good: bool, bad: bool, reward: f64, penalty: f64) -> f64 {
    if good {
        reward
    } else if bad {
        penalty
    } else {
        0.0
    }
}

fn has_loved_trait(shoe: &ShoeRecord, t: LovedTrait) -> bool {
    let feel = &shoe.feel;
    match t {
        LovedTrait::Bouncy => feel.bounce >= 4,
        LovedTrait::Soft => feel.cushion >= 4,
        LovedTrait::Light => feel.weight_feel <= 2,
        LovedTrait::Stable => feel.stability >= 4,
        LovedTrait::Responsive => feel.bounce >= 3 && feel.weight_feel <= 3,
        LovedTrait::GroundFeel => feel.ground_feel >= 4,
        LovedTrait::Grippy => shoe.meta.wet_grip == WetGrip::Good,
    }
}

fn has_disliked_trait(shoe: &ShoeRecord, t: DislikedTrait) -> bool {
    let feel = &shoe.feel;
    match t {
        DislikedTrait::TooSoft => feel.cushion >= 5,
        DislikedTrait::TooFirm => feel.cushion <= 2,
        DislikedTrait::Unstable => feel.stability <= 2,
        DislikedTrait::Heavy => feel.weight_feel >= 4,
        DislikedTrait::Narrow => shoe.fit.toe_box == ToeBox::Narrow,
        DislikedTrait::Flat => feel.bounce <= 2,
        DislikedTrait::Slippery => shoe.meta.wet_grip == WetGrip::Poor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::{DropPreference, FeelPreferences};
    use crate::profile::{CurrentShoe, RunType};
    use crate::rotation::analyze_rotation;
    use stride_catalogue::{Catalogue, PlateMaterial};
    use stride_test_utils::{catalogue_of, ShoeBuilder};

    fn empty_analysis() -> RotationAnalysis {
        let catalogue: Catalogue = catalogue_of(vec![ShoeBuilder::new("x").daily().build()]);
        analyze_rotation(&[], &RunnerProfile::default(), &catalogue)
    }

    fn score_with(
        shoe: &ShoeRecord,
        constraints: &Constraints,
        profile: &RunnerProfile,
        signals: &[ContextSignal],
    ) -> ScoreBreakdown {
        let analysis = empty_analysis();
        let inputs = ScoringInputs {
            profile,
            analysis: &analysis,
            signals,
            contrast: false,
        };
        ShoeScorer::default().score(shoe, constraints, &inputs).breakdown
    }

    #[test]
    fn test_category_points_capped() {
        let shoe = ShoeBuilder::new("x").race().trail().build();
        let constraints = Constraints {
            categories: vec![Category::Race, Category::Trail],
            ..Constraints::default()
        };
        let b = score_with(&shoe, &constraints, &RunnerProfile::default(), &[]);
        assert_eq!(b.category, 25.0);
    }

    #[test]
    fn test_explicit_cushion_curve() {
        let soft = ShoeBuilder::new("soft").daily().feel([5, 3, 3, 3, 3, 3]).build();
        let firm = ShoeBuilder::new("firm").daily().feel([1, 3, 3, 3, 3, 3]).build();
        let constraints = Constraints::for_category(Category::Daily).with_feel(
            FeelPreferences::ignore_all().with(FeelDimension::Cushion, Preference::Explicit(5)),
        );
        let profile = RunnerProfile::default();
        let soft_b = score_with(&soft, &constraints, &profile, &[]);
        let firm_b = score_with(&firm, &constraints, &profile, &[]);
        assert_eq!(soft_b.feel, 10.0);
        assert_eq!(firm_b.feel, -36.0);
    }

    #[test]
    fn test_decide_for_me_uses_archetype_range() {
        // Daily cushion range is 3-4; everything else sits inside its range.
        let shoe = ShoeBuilder::new("x").daily().feel([1, 3, 3, 3, 3, 3]).build();
        let b = score_with(
            &shoe,
            &Constraints::for_category(Category::Daily),
            &RunnerProfile::default(),
            &[],
        );
        assert_eq!(b.feel, 5.0 * 5.0 - 4.0 * 2.0);
    }

    #[test]
    fn test_heel_drop_best_bucket() {
        let shoe = ShoeBuilder::new("x").daily().drop(10.0).build();
        let constraints = Constraints::for_category(Category::Daily).with_heel_drop(
            DropPreference::Explicit(vec![DropBucket::Zero, DropBucket::Medium]),
        );
        let b = score_with(&shoe, &constraints, &RunnerProfile::default(), &[]);
        assert_eq!(b.heel_drop, 4.0);
    }

    #[test]
    fn test_stability_bonus_only_with_need() {
        let shoe = ShoeBuilder::new("x")
            .daily()
            .support(Support::MaxStability)
            .build();
        let without = score_with(
            &shoe,
            &Constraints::for_category(Category::Daily),
            &RunnerProfile::default(),
            &[],
        );
        let with = score_with(
            &shoe,
            &Constraints::for_category(Category::Daily).with_stability_need(true),
            &RunnerProfile::default(),
            &[],
        );
        assert_eq!(without.stability, 0.0);
        assert_eq!(with.stability, 8.0);
    }

    #[test]
    fn test_availability_and_versatility() {
        let shoe = ShoeBuilder::new("x")
            .super_versatile()
            .release(ReleaseStatus::New)
            .build();
        let b = score_with(
            &shoe,
            &Constraints::for_category(Category::Daily),
            &RunnerProfile::default(),
            &[],
        );
        assert_eq!(b.availability, 4.0);
        assert_eq!(b.versatility, 4.0);
        assert_eq!(b.category, 10.0);
    }

    #[test]
    fn test_context_signals() {
        let shoe = ShoeBuilder::new("x")
            .brand("Acme")
            .daily()
            .feel([4, 3, 3, 3, 3, 3])
            .toe_box(ToeBox::Narrow)
            .build();
        let signals = vec![
            ContextSignal::Injury {
                injury: Injury::Knee,
            },
            ContextSignal::Fit {
                issue: FitIssue::TightToeBox,
            },
            ContextSignal::PastShoe {
                brand: "acme".into(),
                sentiment: Sentiment::Negative,
            },
        ];
        let b = score_with(
            &shoe,
            &Constraints::for_category(Category::Daily),
            &RunnerProfile::default(),
            &signals,
        );
        assert_eq!(b.context, 5.0 - 6.0 - 4.0);
    }

    #[test]
    fn test_rotation_traits() {
        let catalogue = catalogue_of(vec![
            ShoeBuilder::new("owned").daily().build(),
            ShoeBuilder::new("bouncy").daily().feel([3, 5, 3, 3, 3, 4]).build(),
        ]);
        let current = vec![CurrentShoe::new("owned", vec![RunType::EasyRuns])
            .with_sentiment(Sentiment::Positive)
            .loving(vec![LovedTrait::Bouncy])
            .disliking(vec![DislikedTrait::Heavy])];
        let profile = RunnerProfile::default();
        let analysis = analyze_rotation(&current, &profile, &catalogue);
        let inputs = ScoringInputs {
            profile: &profile,
            analysis: &analysis,
            signals: &[],
            contrast: false,
        };
        let shoe = catalogue.get("bouncy").unwrap();
        let b = ShoeScorer::default()
            .score(shoe, &Constraints::for_category(Category::Daily), &inputs)
            .breakdown;
        assert_eq!(b.rotation, 3.0 - 5.0);
    }

    #[test]
    fn test_contrast_bonus_capped() {
        let catalogue = catalogue_of(vec![
            ShoeBuilder::new("owned").daily().feel([3, 3, 3, 3, 3, 3]).build(),
            ShoeBuilder::new("wild").daily().feel([5, 5, 1, 5, 1, 1]).build(),
        ]);
        let current = vec![CurrentShoe::new("owned", vec![RunType::AllRuns])];
        let profile = RunnerProfile::default();
        let analysis = analyze_rotation(&current, &profile, &catalogue);
        let inputs = ScoringInputs {
            profile: &profile,
            analysis: &analysis,
            signals: &[],
            contrast: true,
        };
        let shoe = catalogue.get("wild").unwrap();
        let b = ShoeScorer::default()
            .score(shoe, &Constraints::for_category(Category::Daily), &inputs)
            .breakdown;
        assert_eq!(b.contrast, 12.0);
    }

    #[test]
    fn test_beginner_profile_penalises_plates() {
        let shoe = ShoeBuilder::new("x")
            .daily()
            .plate(PlateMaterial::Nylon)
            .build();
        let profile = RunnerProfile {
            experience: Experience::Beginner,
            ..RunnerProfile::default()
        };
        let b = score_with(&shoe, &Constraints::for_category(Category::Daily), &profile, &[]);
        assert_eq!(b.profile, -3.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let shoe = ShoeBuilder::new("x").daily().feel([4, 4, 2, 3, 2, 2]).build();
        let constraints = Constraints::for_category(Category::Daily);
        let profile = RunnerProfile::default();
        assert_eq!(
            score_with(&shoe, &constraints, &profile, &[]),
            score_with(&shoe, &constraints, &profile, &[])
        );
    }
}
