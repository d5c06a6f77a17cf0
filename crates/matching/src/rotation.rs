//! Rotation analysis: what the runner's current shoes cover, what they
//! should cover, and where shoes overlap or are misused.

use serde::Serialize;
use std::collections::BTreeSet;
use stride_catalogue::{Catalogue, Category, FeelDimension, ShoeRecord};

use crate::profile::{
    CurrentShoe, DislikedTrait, Lifecycle, LovedTrait, PrimaryGoal, RunnerProfile, Sentiment,
    TrailFrequency, TrainingPattern,
};

/// Weekly distance at which a dedicated recovery shoe becomes a requirement.
pub const HIGH_VOLUME_KM: f64 = 50.0;

/// Two shoes "feel the same" when every core dimension is within this many points.
const SIMILAR_FEEL_TOLERANCE: u8 = 1;

/// Current shoes that overlap in feel and share a usage category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redundancy {
    pub category: Category,
    pub shoe_ids: Vec<String>,
}

/// A current shoe used for a category it is not built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Misuse {
    pub shoe_id: String,
    pub used_for: Category,
    pub reason: String,
}

/// Mean feel of the resolved rotation, used by the contrast bonus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageFeel {
    pub cushion: f64,
    pub bounce: f64,
    pub stability: f64,
    pub rocker: f64,
    pub ground_feel: f64,
    pub weight_feel: f64,
}

impl AverageFeel {
    fn of(shoes: &[&ShoeRecord]) -> Option<Self> {
        if shoes.is_empty() {
            return None;
        }
        let n = shoes.len() as f64;
        let mean = |d: FeelDimension| shoes.iter().map(|s| f64::from(s.feel.get(d))).sum::<f64>() / n;
        Some(Self {
            cushion: mean(FeelDimension::Cushion),
            bounce: mean(FeelDimension::Bounce),
            stability: mean(FeelDimension::Stability),
            rocker: mean(FeelDimension::Rocker),
            ground_feel: mean(FeelDimension::GroundFeel),
            weight_feel: mean(FeelDimension::WeightFeel),
        })
    }

    pub fn get(&self, dimension: FeelDimension) -> f64 {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
            FeelDimension::WeightFeel => self.weight_feel,
        }
    }
}

/// Result of [`analyze_rotation`]. A pure function of its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationAnalysis {
    pub shoe_count: usize,
    /// Ids of every current shoe, resolved or not.
    pub owned_ids: BTreeSet<String>,
    pub covered: BTreeSet<Category>,
    pub required: BTreeSet<Category>,
    /// `required - covered`, in taxonomy order.
    pub missing: Vec<Category>,
    pub redundancies: Vec<Redundancy>,
    pub misuse: Vec<Misuse>,
    pub all_positive: bool,
    pub any_negative: bool,
    pub any_near_end: bool,
    /// A resolved current shoe with cushion 4 or more.
    pub has_protective_shoe: bool,
    pub loved: BTreeSet<LovedTrait>,
    pub disliked: BTreeSet<DislikedTrait>,
    pub average_feel: Option<AverageFeel>,
}

impl RotationAnalysis {
    pub fn covers(&self, category: Category) -> bool {
        self.covered.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.shoe_count == 0
    }
}

/// Categories the profile implies the runner should have covered.
pub fn required_categories(profile: &RunnerProfile) -> BTreeSet<Category> {
    let mut required = BTreeSet::new();

    if profile.trail_running != Some(TrailFrequency::Exclusively) {
        required.insert(Category::Daily);
    }
    if matches!(
        profile.training_pattern,
        TrainingPattern::Structured | TrainingPattern::WorkoutFocused
    ) || profile.primary_goal == PrimaryGoal::GetFaster
    {
        required.insert(Category::Workout);
    }
    if profile.training_pattern == TrainingPattern::WorkoutFocused
        || profile.primary_goal == PrimaryGoal::InjuryRecovery
        || profile.weekly_km().is_some_and(|km| km >= HIGH_VOLUME_KM)
    {
        required.insert(Category::Recovery);
    }
    if profile.primary_goal == PrimaryGoal::TrainForRace {
        required.insert(Category::Race);
    }
    if profile.trails_regularly() {
        required.insert(Category::Trail);
    }

    required
}

/// Analyzes the current rotation against the profile.
pub fn analyze_rotation(
    current: &[CurrentShoe],
    profile: &RunnerProfile,
    catalogue: &Catalogue,
) -> RotationAnalysis {
    let covered: BTreeSet<Category> = current.iter().flat_map(|s| s.usage_categories()).collect();
    let required = required_categories(profile);
    let missing: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| required.contains(c) && !covered.contains(c))
        .collect();

    let resolved: Vec<(&CurrentShoe, &ShoeRecord)> = current
        .iter()
        .filter_map(|s| catalogue.get(&s.shoe_id).map(|r| (s, r)))
        .collect();

    let records: Vec<&ShoeRecord> = resolved.iter().map(|(_, r)| *r).collect();

    let mut loved = BTreeSet::new();
    let mut disliked = BTreeSet::new();
    for shoe in current {
        if shoe.sentiment == Sentiment::Positive {
            loved.extend(shoe.loved.iter().copied());
        }
        disliked.extend(shoe.disliked.iter().copied());
    }

    let analysis = RotationAnalysis {
        shoe_count: current.len(),
        owned_ids: current.iter().map(|s| s.shoe_id.clone()).collect(),
        covered,
        required,
        missing,
        redundancies: find_redundancies(&resolved),
        misuse: find_misuse(&resolved, profile),
        all_positive: !current.is_empty()
            && current.iter().all(|s| s.sentiment == Sentiment::Positive),
        any_negative: current.iter().any(|s| s.sentiment == Sentiment::Negative),
        any_near_end: current
            .iter()
            .any(|s| s.lifecycle == Some(Lifecycle::NearEnd)),
        has_protective_shoe: records.iter().any(|r| r.feel.cushion >= 4),
        loved,
        disliked,
        average_feel: AverageFeel::of(&records),
    };

    tracing::debug!(
        target: "stride::rotation",
        shoes = analysis.shoe_count,
        resolved = records.len(),
        missing = ?analysis.missing,
        redundancies = analysis.redundancies.len(),
        misuse = analysis.misuse.len(),
        "Analyzed rotation"
    );

    analysis
}

fn feels_alike(a: &ShoeRecord, b: &ShoeRecord) -> bool {
    FeelDimension::CORE
        .into_iter()
        .all(|d| a.feel.get(d).abs_diff(b.feel.get(d)) <= SIMILAR_FEEL_TOLERANCE)
}

/// Greedy clustering per usage category: a shoe joins a cluster only if it
/// feels alike to every member already in it.
fn find_redundancies(resolved: &[(&CurrentShoe, &ShoeRecord)]) -> Vec<Redundancy> {
    let mut found: Vec<Redundancy> = Vec::new();

    for category in Category::ALL {
        let users: Vec<&ShoeRecord> = resolved
            .iter()
            .filter(|(s, _)| s.usage_categories().any(|c| c == category))
            .map(|(_, r)| *r)
            .collect();

        let mut assigned = vec![false; users.len()];
        for i in 0..users.len() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let mut cluster = vec![users[i]];
            for j in (i + 1)..users.len() {
                if !assigned[j] && cluster.iter().all(|m| feels_alike(m, users[j])) {
                    assigned[j] = true;
                    cluster.push(users[j]);
                }
            }
            if cluster.len() < 2 {
                continue;
            }
            let mut shoe_ids: Vec<String> = cluster.iter().map(|r| r.id.clone()).collect();
            shoe_ids.dedup();
            if shoe_ids.len() >= 2 && !found.iter().any(|r| r.shoe_ids == shoe_ids) {
                found.push(Redundancy { category, shoe_ids });
            }
        }
    }

    found
}

fn misuse_reason(shoe: &ShoeRecord, used_for: Category, profile: &RunnerProfile) -> Option<String> {
    let flags = &shoe.categories;
    let name = shoe.display_name();
    match used_for {
        Category::Daily | Category::Recovery if flags.is_race_only() => Some(format!(
            "The {name} is a race shoe, but it is carrying your everyday mileage; \
             it will wear out fast and offers little protection on easy days."
        )),
        Category::Daily | Category::Race if flags.is_trail_only() => Some(format!(
            "The {name} is built for trails, but you are running it on the road; \
             the lugs wear quickly and it feels sluggish on pavement."
        )),
        Category::Trail if !flags.trail && profile.trails_regularly() => Some(format!(
            "The {name} is a road shoe handling your regular trail running; \
             it lacks the grip and protection off-road terrain needs."
        )),
        Category::Recovery if shoe.feel.cushion <= 2 => Some(format!(
            "The {name} is firm and low on cushioning, which makes it a poor fit \
             for recovery runs."
        )),
        _ => None,
    }
}

fn find_misuse(resolved: &[(&CurrentShoe, &ShoeRecord)], profile: &RunnerProfile) -> Vec<Misuse> {
    let mut findings = Vec::new();
    for (current, record) in resolved {
        let used_for: BTreeSet<Category> = current.usage_categories().collect();
        for category in used_for {
            if let Some(reason) = misuse_reason(record, category, profile) {
                findings.push(Misuse {
                    shoe_id: record.id.clone(),
                    used_for: category,
                    reason,
                });
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{DistanceUnit, RunType, WeeklyVolume};
    use stride_test_utils::{catalogue_of, ShoeBuilder};

    fn catalogue() -> Catalogue {
        catalogue_of(vec![
            ShoeBuilder::new("daily-a").daily().feel([3, 3, 3, 3, 3, 3]).build(),
            ShoeBuilder::new("daily-b").daily().feel([4, 3, 2, 3, 2, 3]).build(),
            ShoeBuilder::new("daily-c").daily().feel([1, 5, 5, 1, 5, 1]).build(),
            ShoeBuilder::new("racer").race().feel([3, 5, 2, 5, 2, 1]).build(),
            ShoeBuilder::new("mud").trail().feel([3, 2, 4, 2, 3, 3]).build(),
        ])
    }

    #[test]
    fn test_required_categories_for_structured_racer() {
        let profile = RunnerProfile {
            training_pattern: TrainingPattern::Structured,
            primary_goal: PrimaryGoal::TrainForRace,
            ..RunnerProfile::default()
        };
        let required = required_categories(&profile);
        assert_eq!(
            required.into_iter().collect::<Vec<_>>(),
            vec![Category::Daily, Category::Workout, Category::Race]
        );
    }

    #[test]
    fn test_exclusive_trail_runner_needs_only_trail() {
        let profile = RunnerProfile {
            trail_running: Some(TrailFrequency::Exclusively),
            ..RunnerProfile::default()
        };
        let required = required_categories(&profile);
        assert_eq!(required.into_iter().collect::<Vec<_>>(), vec![Category::Trail]);
    }

    #[test]
    fn test_high_volume_requires_recovery() {
        let profile = RunnerProfile {
            weekly_volume: Some(WeeklyVolume {
                amount: 60.0,
                unit: DistanceUnit::Km,
            }),
            ..RunnerProfile::default()
        };
        assert!(required_categories(&profile).contains(&Category::Recovery));
    }

    #[test]
    fn test_empty_rotation() {
        let analysis = analyze_rotation(&[], &RunnerProfile::default(), &catalogue());
        assert!(analysis.is_empty());
        assert!(analysis.covered.is_empty());
        assert_eq!(analysis.missing, vec![Category::Daily]);
        assert!(!analysis.all_positive);
        assert!(analysis.average_feel.is_none());
    }

    #[test]
    fn test_redundancy_cluster_requires_shared_category() {
        let current = vec![
            CurrentShoe::new("daily-a", vec![RunType::EasyRuns]),
            CurrentShoe::new("daily-b", vec![RunType::LongRuns]),
            CurrentShoe::new("daily-c", vec![RunType::EasyRuns]),
        ];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert_eq!(analysis.redundancies.len(), 1);
        assert_eq!(analysis.redundancies[0].category, Category::Daily);
        assert_eq!(
            analysis.redundancies[0].shoe_ids,
            vec!["daily-a".to_string(), "daily-b".to_string()]
        );
    }

    #[test]
    fn test_no_redundancy_across_different_categories() {
        let current = vec![
            CurrentShoe::new("daily-a", vec![RunType::EasyRuns]),
            CurrentShoe::new("daily-b", vec![RunType::Workouts]),
        ];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert!(analysis.redundancies.is_empty());
    }

    #[test]
    fn test_race_shoe_for_easy_runs_is_misuse() {
        let current = vec![CurrentShoe::new("racer", vec![RunType::AllRuns])];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert_eq!(analysis.misuse.len(), 1);
        assert_eq!(analysis.misuse[0].used_for, Category::Daily);
        assert_eq!(analysis.misuse[0].shoe_id, "racer");
    }

    #[test]
    fn test_trail_shoe_for_road_racing_is_misuse() {
        let current = vec![CurrentShoe::new("mud", vec![RunType::Races])];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert_eq!(analysis.misuse[0].used_for, Category::Race);
    }

    #[test]
    fn test_unknown_shoes_count_but_are_not_resolved() {
        let current = vec![CurrentShoe::new("not-in-catalogue", vec![RunType::EasyRuns])
            .with_sentiment(Sentiment::Positive)
            .at_stage(Lifecycle::NearEnd)];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert_eq!(analysis.shoe_count, 1);
        assert!(analysis.covers(Category::Daily));
        assert!(analysis.all_positive);
        assert!(analysis.any_near_end);
        assert!(analysis.average_feel.is_none());
    }

    #[test]
    fn test_loved_traits_only_from_positive_shoes() {
        let current = vec![
            CurrentShoe::new("daily-a", vec![RunType::EasyRuns])
                .with_sentiment(Sentiment::Positive)
                .loving(vec![LovedTrait::Bouncy]),
            CurrentShoe::new("daily-c", vec![RunType::Workouts])
                .with_sentiment(Sentiment::Negative)
                .loving(vec![LovedTrait::Light])
                .disliking(vec![DislikedTrait::TooFirm]),
        ];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        assert!(analysis.loved.contains(&LovedTrait::Bouncy));
        assert!(!analysis.loved.contains(&LovedTrait::Light));
        assert!(analysis.disliked.contains(&DislikedTrait::TooFirm));
        assert!(analysis.any_negative);
        assert!(!analysis.all_positive);
    }

    #[test]
    fn test_average_feel() {
        let current = vec![
            CurrentShoe::new("daily-a", vec![RunType::EasyRuns]),
            CurrentShoe::new("daily-c", vec![RunType::EasyRuns]),
        ];
        let analysis = analyze_rotation(&current, &RunnerProfile::default(), &catalogue());
        let avg = analysis.average_feel.unwrap();
        assert!((avg.cushion - 2.0).abs() < 1e-9);
        assert!((avg.bounce - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_analysis_is_pure() {
        let current = vec![
            CurrentShoe::new("daily-a", vec![RunType::EasyRuns]),
            CurrentShoe::new("racer", vec![RunType::Races]),
        ];
        let profile = RunnerProfile::default();
        let cat = catalogue();
        assert_eq!(
            analyze_rotation(&current, &profile, &cat),
            analyze_rotation(&current, &profile, &cat)
        );
    }
}
