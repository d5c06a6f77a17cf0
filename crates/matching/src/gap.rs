//! Gap detection: pick the single highest-priority deficiency in a rotation.
//!
//! Candidate gaps are evaluated along a fixed ladder (misuse, coverage,
//! performance, recovery, redundancy). The first high-severity candidate
//! wins, then the first medium, then the first low; with no candidates the
//! runner gets an exploration gap.

use serde::{Deserialize, Serialize};
use stride_catalogue::Category;

use crate::profile::{Experience, PaceBucket, PrimaryGoal, RunnerProfile, TrailFrequency, TrainingPattern};
use crate::rotation::{RotationAnalysis, HIGH_VOLUME_KM};

/// Weekly km per owned shoe above which the chosen gap escalates to high.
pub const KM_PER_SHOE_ESCALATION: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// How urgent the recommendation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Genuine,
    Improvement,
    Exploration,
}

/// The kind of gap, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GapKind {
    Misuse { shoe_id: String, used_for: Category },
    Coverage { missing: Category },
    Performance,
    Recovery,
    Redundancy { shoe_ids: Vec<String> },
    /// Rotation is fine; suggest something different to try.
    Exploration,
}

impl GapKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Misuse { .. } => "misuse",
            Self::Coverage { .. } => "coverage",
            Self::Performance => "performance",
            Self::Recovery => "recovery",
            Self::Redundancy { .. } => "redundancy",
            Self::Exploration => "exploration",
        }
    }
}

/// The single gap driving an analysis-mode recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub kind: GapKind,
    pub severity: Severity,
    pub rationale: String,
    pub target_category: Category,
    pub tier: Tier,
}

impl Gap {
    fn new(kind: GapKind, severity: Severity, target: Category, rationale: impl Into<String>) -> Self {
        let tier = tier_for(&kind, severity);
        Self {
            kind,
            severity,
            rationale: rationale.into(),
            target_category: target,
            tier,
        }
    }

    pub fn is_exploration(&self) -> bool {
        matches!(self.kind, GapKind::Exploration)
    }
}

fn tier_for(kind: &GapKind, severity: Severity) -> Tier {
    match (kind, severity) {
        (GapKind::Exploration, _) => Tier::Exploration,
        (_, Severity::High) => Tier::Genuine,
        _ => Tier::Improvement,
    }
}

/// Detects the highest-priority gap. Pure and idempotent.
pub fn detect_gap(analysis: &RotationAnalysis, profile: &RunnerProfile) -> Gap {
    let candidates: Vec<Gap> = [
        misuse_gap(analysis),
        coverage_gap(analysis, profile),
        performance_gap(analysis, profile),
        recovery_gap(analysis, profile),
        redundancy_gap(analysis),
    ]
    .into_iter()
    .flatten()
    .collect();

    let chosen = [Severity::High, Severity::Medium, Severity::Low]
        .into_iter()
        .find_map(|severity| candidates.iter().find(|g| g.severity == severity).cloned());

    let gap = match chosen {
        Some(gap) => escalate_for_load(gap, analysis, profile),
        None => exploration_gap(analysis),
    };

    tracing::debug!(
        target: "stride::gap",
        kind = gap.kind.label(),
        severity = ?gap.severity,
        target = %gap.target_category,
        candidates = candidates.len(),
        "Detected gap"
    );

    gap
}

fn misuse_gap(analysis: &RotationAnalysis) -> Option<Gap> {
    let finding = analysis.misuse.first()?;
    Some(Gap::new(
        GapKind::Misuse {
            shoe_id: finding.shoe_id.clone(),
            used_for: finding.used_for,
        },
        Severity::High,
        finding.used_for,
        format!(
            "{} A dedicated {} shoe would take that job off its hands.",
            finding.reason, finding.used_for
        ),
    ))
}

fn coverage_gap(analysis: &RotationAnalysis, profile: &RunnerProfile) -> Option<Gap> {
    if analysis.is_empty() {
        let target = Category::DEFAULT_VERSATILE;
        return Some(Gap::new(
            GapKind::Coverage { missing: target },
            Severity::High,
            target,
            "You don't have any running shoes in your rotation yet. \
             A versatile daily trainer is the best place to start.",
        ));
    }

    let missing = *analysis.missing.first()?;
    let critical = missing == Category::Daily
        || (missing == Category::Trail
            && profile.trail_running == Some(TrailFrequency::Exclusively));
    let severity = if critical { Severity::High } else { Severity::Medium };

    Some(Gap::new(
        GapKind::Coverage { missing },
        severity,
        missing,
        format!(
            "None of your current shoes is used for {} running, \
             but your training calls for one.",
            missing
        ),
    ))
}

fn performance_gap(analysis: &RotationAnalysis, profile: &RunnerProfile) -> Option<Gap> {
    let goal_signal = matches!(
        profile.primary_goal,
        PrimaryGoal::GetFaster | PrimaryGoal::TrainForRace
    );
    let pace_signal = matches!(
        profile.pace_bucket(),
        Some(PaceBucket::Fast | PaceBucket::Quick)
    );
    if !(goal_signal || pace_signal) {
        return None;
    }
    if analysis.covers(Category::Workout) || analysis.covers(Category::Race) {
        return None;
    }

    let target = if profile.primary_goal == PrimaryGoal::TrainForRace
        && profile.experience > Experience::Beginner
    {
        Category::Race
    } else {
        Category::Workout
    };

    Some(Gap::new(
        GapKind::Performance,
        Severity::Medium,
        target,
        format!(
            "You're chasing faster times, but nothing in your rotation is built for speed. \
             A {} shoe adds the responsiveness your quality sessions need.",
            target
        ),
    ))
}

fn recovery_gap(analysis: &RotationAnalysis, profile: &RunnerProfile) -> Option<Gap> {
    let injury = profile.primary_goal == PrimaryGoal::InjuryRecovery;
    let high_load = profile.weekly_km().is_some_and(|km| km >= HIGH_VOLUME_KM)
        || profile.training_pattern == TrainingPattern::WorkoutFocused;
    if !(injury || high_load) {
        return None;
    }
    if analysis.covers(Category::Recovery) || analysis.has_protective_shoe {
        return None;
    }

    let severity = if injury { Severity::High } else { Severity::Medium };
    let rationale = if injury {
        "You're coming back from injury and nothing in your rotation is especially protective. \
         A cushioned recovery shoe reduces the load on easy days."
    } else {
        "Your training load is high and nothing in your rotation is especially protective. \
         A cushioned recovery shoe helps your legs absorb the work."
    };

    Some(Gap::new(GapKind::Recovery, severity, Category::Recovery, rationale))
}

fn redundancy_gap(analysis: &RotationAnalysis) -> Option<Gap> {
    let cluster = analysis.redundancies.first()?;
    // Only worth a swap while something is still uncovered.
    let target = analysis
        .missing
        .first()
        .copied()
        .or_else(|| uncovered_road(analysis))?;

    Some(Gap::new(
        GapKind::Redundancy {
            shoe_ids: cluster.shoe_ids.clone(),
        },
        Severity::Low,
        target,
        format!(
            "{} feel almost the same and both cover {} runs. \
             Swapping one of them for a {} shoe would widen what your rotation can do.",
            cluster.shoe_ids.join(" and "),
            cluster.category,
            target
        ),
    ))
}

/// First road category the rotation does not cover, favouring variety.
fn uncovered_road(analysis: &RotationAnalysis) -> Option<Category> {
    [
        Category::Workout,
        Category::Recovery,
        Category::Race,
        Category::Daily,
    ]
    .into_iter()
    .find(|c| !analysis.covers(*c))
}

fn first_uncovered(analysis: &RotationAnalysis) -> Category {
    uncovered_road(analysis).unwrap_or(Category::DEFAULT_VERSATILE)
}

fn exploration_gap(analysis: &RotationAnalysis) -> Gap {
    let target = first_uncovered(analysis);

    Gap::new(
        GapKind::Exploration,
        Severity::Low,
        target,
        format!(
            "Your rotation covers what your training needs. \
             If you want variety, a {} shoe with a different feel is worth a try.",
            target
        ),
    )
}

fn escalate_for_load(mut gap: Gap, analysis: &RotationAnalysis, profile: &RunnerProfile) -> Gap {
    let Some(km) = profile.weekly_km() else {
        return gap;
    };
    let shoes = analysis.shoe_count.max(1);
    let per_shoe = km / shoes as f64;
    if per_shoe <= KM_PER_SHOE_ESCALATION {
        return gap;
    }

    gap.severity = Severity::High;
    gap.tier = tier_for(&gap.kind, gap.severity);
    gap.rationale.push_str(&format!(
        " At {:.0} km a week across {} shoe{}, each pair takes a heavy load; \
         adding another shoe spreads the wear.",
        km,
        analysis.shoe_count,
        if analysis.shoe_count == 1 { "" } else { "s" }
    ));
    gap
}
