//! Injected scoring configuration.
//!
//! Every constant the scorer, retrieval and selection stages use lives in
//! [`ScoringTable`]. The `Default` impl is the canonical table; a TOML
//! override can replace any subset of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stride_catalogue::{Category, FeelDimension};

/// Inclusive 1-5 range a category archetype expects for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeelRange {
    pub min: u8,
    pub max: u8,
}

impl FeelRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Distance to the nearest edge; zero inside the range.
    pub fn distance(&self, value: u8) -> u8 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0
        }
    }
}

/// Acceptable feel ranges for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub cushion: FeelRange,
    pub bounce: FeelRange,
    pub stability: FeelRange,
    pub rocker: FeelRange,
    pub ground_feel: FeelRange,
    pub weight_feel: FeelRange,
}

impl Archetype {
    pub fn get(&self, dimension: FeelDimension) -> FeelRange {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Archetypes {
    pub daily: Archetype,
    pub recovery: Archetype,
    pub workout: Archetype,
    pub race: Archetype,
    pub trail: Archetype,
}

impl Archetypes {
    pub fn get(&self, category: Category) -> &Archetype {
        match category {
            Category::Daily => &self.daily,
            Category::Recovery => &self.recovery,
            Category::Workout => &self.workout,
            Category::Race => &self.race,
            Category::Trail => &self.trail,
        }
    }
}

impl Default for Archetypes {
    fn default() -> Self {
        let r = FeelRange::new;
        Self {
            daily: Archetype {
                cushion: r(3, 4),
                bounce: r(2, 4),
                stability: r(3, 4),
                rocker: r(2, 4),
                ground_feel: r(2, 3),
                weight_feel: r(2, 3),
            },
            recovery: Archetype {
                cushion: r(4, 5),
                bounce: r(2, 4),
                stability: r(3, 5),
                rocker: r(3, 5),
                ground_feel: r(1, 2),
                weight_feel: r(3, 5),
            },
            workout: Archetype {
                cushion: r(3, 4),
                bounce: r(4, 5),
                stability: r(2, 4),
                rocker: r(3, 5),
                ground_feel: r(2, 4),
                weight_feel: r(1, 3),
            },
            race: Archetype {
                cushion: r(3, 5),
                bounce: r(4, 5),
                stability: r(1, 3),
                rocker: r(4, 5),
                ground_feel: r(1, 3),
                weight_feel: r(1, 2),
            },
            trail: Archetype {
                cushion: r(2, 4),
                bounce: r(2, 4),
                stability: r(3, 5),
                rocker: r(1, 3),
                ground_feel: r(2, 4),
                weight_feel: r(2, 4),
            },
        }
    }
}

/// Points for matching a requested category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPoints {
    pub daily: f64,
    pub recovery: f64,
    pub workout: f64,
    pub race: f64,
    pub trail: f64,
    pub cap: f64,
}

impl CategoryPoints {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Daily => self.daily,
            Category::Recovery => self.recovery,
            Category::Workout => self.workout,
            Category::Race => self.race,
            Category::Trail => self.trail,
        }
    }
}

impl Default for CategoryPoints {
    fn default() -> Self {
        Self {
            daily: 10.0,
            recovery: 10.0,
            workout: 10.0,
            race: 15.0,
            trail: 15.0,
            cap: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeelScoring {
    /// Explicit-preference score indexed by distance 0-4.
    pub explicit_curve: [f64; 5],
    pub in_range: f64,
    /// Subtracted per unit outside the archetype range.
    pub per_unit_outside: f64,
}

impl Default for FeelScoring {
    fn default() -> Self {
        Self {
            explicit_curve: [10.0, 0.0, -10.0, -22.0, -36.0],
            in_range: 5.0,
            per_unit_outside: 4.0,
        }
    }
}

/// Flat bonuses that do not depend on the runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bonuses {
    /// Heel-drop score indexed by bucket distance 0-4.
    pub drop_curve: [f64; 5],
    pub stability_support: f64,
    pub max_stability_support: f64,
    pub release_new: f64,
    pub release_available: f64,
    pub super_versatile: f64,
    pub contrast_factor: f64,
    pub contrast_cap: f64,
}

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            drop_curve: [10.0, 4.0, -6.0, -14.0, -20.0],
            stability_support: 6.0,
            max_stability_support: 8.0,
            release_new: 4.0,
            release_available: 2.0,
            super_versatile: 4.0,
            contrast_factor: 2.0,
            contrast_cap: 12.0,
        }
    }
}

/// Runner-profile modifiers. Positive values reward, negative penalise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileModifiers {
    pub beginner_plate: f64,
    pub beginner_stable: f64,
    pub competitive_plate: f64,
    pub faster_bounce: f64,
    pub injury_cushion: f64,
    pub injury_stable: f64,
    pub infrequent_versatile: f64,
    pub workout_focused_responsive: f64,
    pub fast_pace_light: f64,
    pub relaxed_pace_cushion: f64,
    pub high_bmi_cushion: f64,
    pub high_bmi_firm: f64,
    pub heel_strike_drop: f64,
    pub forefoot_low_drop: f64,
    pub trail_grip: f64,
}

impl Default for ProfileModifiers {
    fn default() -> Self {
        Self {
            beginner_plate: -3.0,
            beginner_stable: 2.0,
            competitive_plate: 3.0,
            faster_bounce: 3.0,
            injury_cushion: 4.0,
            injury_stable: 2.0,
            infrequent_versatile: 2.0,
            workout_focused_responsive: 2.0,
            fast_pace_light: 3.0,
            relaxed_pace_cushion: 2.0,
            high_bmi_cushion: 4.0,
            high_bmi_firm: -4.0,
            heel_strike_drop: 2.0,
            forefoot_low_drop: 2.0,
            trail_grip: 3.0,
        }
    }
}

/// Loved/disliked trait modifiers from the current rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationModifiers {
    pub loved_trait: f64,
    pub disliked_trait: f64,
    /// Cap on the combined rotation modifier, in either direction.
    pub cap: f64,
}

impl Default for RotationModifiers {
    fn default() -> Self {
        Self {
            loved_trait: 3.0,
            disliked_trait: -5.0,
            cap: 12.0,
        }
    }
}

/// External-context modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextModifiers {
    pub injury_match: f64,
    pub injury_mismatch: f64,
    pub fit_match: f64,
    pub fit_mismatch: f64,
    pub climate_match: f64,
    pub climate_mismatch: f64,
    pub request_match: f64,
    pub brand_positive: f64,
    pub brand_negative: f64,
}

impl Default for ContextModifiers {
    fn default() -> Self {
        Self {
            injury_match: 5.0,
            injury_mismatch: -5.0,
            fit_match: 4.0,
            fit_mismatch: -6.0,
            climate_match: 3.0,
            climate_mismatch: -3.0,
            request_match: 4.0,
            brand_positive: 2.0,
            brand_negative: -4.0,
        }
    }
}

/// Retrieval cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cutoffs {
    pub top_n: usize,
    pub min_candidates: usize,
    /// Before preferences are dropped, shoes further than this from an
    /// explicit feel value are not candidates.
    pub feel_tolerance: u8,
    /// Same, in buckets, for explicit heel-drop preferences.
    pub drop_tolerance: usize,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Self {
            top_n: 30,
            min_candidates: 3,
            feel_tolerance: 2,
            drop_tolerance: 2,
        }
    }
}

/// Immutable scoring configuration shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub categories: CategoryPoints,
    pub archetypes: Archetypes,
    pub feel: FeelScoring,
    pub bonuses: Bonuses,
    pub profile: ProfileModifiers,
    pub rotation: RotationModifiers,
    pub context: ContextModifiers,
    pub cutoffs: Cutoffs,
}

impl ScoringTable {
    /// Parses a table from TOML. Missing sections keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: ScoringTable =
            toml::from_str(content).context("Failed to parse scoring table")?;
        table.check()?;
        Ok(table)
    }

    /// Loads a table override from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring table {}", path.display()))?;
        let table = Self::from_toml(&content)?;
        tracing::debug!(target: "stride::table", path = %path.display(), "Loaded scoring table override");
        Ok(table)
    }

    fn check(&self) -> Result<()> {
        if self.cutoffs.min_candidates == 0 {
            anyhow::bail!("cutoffs.min_candidates must be at least 1");
        }
        if self.cutoffs.top_n < self.cutoffs.min_candidates {
            anyhow::bail!(
                "cutoffs.top_n ({}) must not be below cutoffs.min_candidates ({})",
                self.cutoffs.top_n,
                self.cutoffs.min_candidates
            );
        }
        for category in Category::ALL {
            let archetype = self.archetypes.get(category);
            for dimension in FeelDimension::ALL {
                let range = archetype.get(dimension);
                if range.min < 1 || range.max > 5 || range.min > range.max {
                    anyhow::bail!(
                        "archetype range for {} {} is invalid: {}-{}",
                        category,
                        dimension.label(),
                        range.min,
                        range.max
                    );
                }
            }
        }
        Ok(())
    }
}
