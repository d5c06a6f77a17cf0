//! Runner profile and current-rotation inputs.

use serde::{Deserialize, Serialize};
use stride_catalogue::Category;

/// Riegel fatigue exponent used to project race times across distances.
const RIEGEL_EXPONENT: f64 = 1.06;
const KM_PER_MILE: f64 = 1.609_344;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Experienced,
    Competitive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    #[default]
    GeneralFitness,
    GetFaster,
    TrainForRace,
    InjuryRecovery,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPattern {
    /// One or two runs a week, no structure.
    Infrequent,
    /// Regular running, nearly all easy.
    #[default]
    MostlyEasy,
    /// Easy running plus some tempo or interval work.
    Structured,
    /// Several quality sessions a week.
    WorkoutFocused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailFrequency {
    Never,
    Sometimes,
    Often,
    Exclusively,
}

impl TrailFrequency {
    pub fn is_regular(&self) -> bool {
        matches!(self, Self::Often | Self::Exclusively)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Km,
    Mi,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolume {
    pub amount: f64,
    pub unit: DistanceUnit,
}

impl WeeklyVolume {
    pub fn km(&self) -> f64 {
        match self.unit {
            DistanceUnit::Km => self.amount,
            DistanceUnit::Mi => self.amount * KM_PER_MILE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceDistance {
    FiveK,
    TenK,
    Half,
    Marathon,
}

impl RaceDistance {
    pub fn km(&self) -> f64 {
        match self {
            Self::FiveK => 5.0,
            Self::TenK => 10.0,
            Self::Half => 21.0975,
            Self::Marathon => 42.195,
        }
    }
}

/// A recent race result used as the pace signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceTime {
    pub distance: RaceDistance,
    pub minutes: f64,
}

impl RaceTime {
    /// Projected 10 km time in minutes.
    pub fn ten_k_equivalent(&self) -> f64 {
        self.minutes * (10.0 / self.distance.km()).powf(RIEGEL_EXPONENT)
    }
}

/// Pace bucket derived from the 10 km equivalent time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceBucket {
    Fast,
    Quick,
    Steady,
    Relaxed,
}

impl PaceBucket {
    pub fn from_ten_k_minutes(minutes: f64) -> Self {
        if minutes < 40.0 {
            Self::Fast
        } else if minutes < 50.0 {
            Self::Quick
        } else if minutes < 60.0 {
            Self::Steady
        } else {
            Self::Relaxed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiBand {
    Under,
    Healthy,
    Over,
    High,
}

impl BmiBand {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Under
        } else if bmi < 25.0 {
            Self::Healthy
        } else if bmi < 30.0 {
            Self::Over
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FootStrike {
    Heel,
    Mid,
    Fore,
    Unsure,
}

/// Brand include or exclude list, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "brands", rename_all = "snake_case")]
pub enum BrandFilter {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl BrandFilter {
    pub fn allows(&self, brand: &str) -> bool {
        let listed = |brands: &[String]| brands.iter().any(|b| b.eq_ignore_ascii_case(brand));
        match self {
            Self::Include(brands) => brands.is_empty() || listed(brands),
            Self::Exclude(brands) => !listed(brands),
        }
    }
}

/// What the runner tells us about themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
    pub experience: Experience,
    pub primary_goal: PrimaryGoal,
    pub training_pattern: TrainingPattern,
    #[serde(default)]
    pub trail_running: Option<TrailFrequency>,
    #[serde(default)]
    pub weekly_volume: Option<WeeklyVolume>,
    #[serde(default)]
    pub race_time: Option<RaceTime>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub foot_strike: Option<FootStrike>,
    #[serde(default)]
    pub brands: Option<BrandFilter>,
}

impl RunnerProfile {
    pub fn weekly_km(&self) -> Option<f64> {
        self.weekly_volume.map(|v| v.km())
    }

    pub fn pace_bucket(&self) -> Option<PaceBucket> {
        self.race_time
            .filter(|r| r.minutes > 0.0)
            .map(|r| PaceBucket::from_ten_k_minutes(r.ten_k_equivalent()))
    }

    pub fn bmi_band(&self) -> Option<BmiBand> {
        match (self.height_cm, self.weight_kg) {
            (Some(h), Some(w)) if h > 0.0 && w > 0.0 => {
                let m = h / 100.0;
                Some(BmiBand::from_bmi(w / (m * m)))
            }
            _ => None,
        }
    }

    pub fn trails_regularly(&self) -> bool {
        self.trail_running.is_some_and(|t| t.is_regular())
    }

    pub fn is_beginner(&self) -> bool {
        self.experience == Experience::Beginner
    }
}

/// Purpose a runner assigns to a shoe they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    AllRuns,
    EasyRuns,
    LongRuns,
    RecoveryRuns,
    Workouts,
    Races,
    Trail,
}

impl RunType {
    /// Usage categories this run type covers.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Self::AllRuns | Self::EasyRuns | Self::LongRuns => &[Category::Daily],
            Self::RecoveryRuns => &[Category::Recovery],
            Self::Workouts => &[Category::Workout],
            Self::Races => &[Category::Race],
            Self::Trail => &[Category::Trail],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LovedTrait {
    Bouncy,
    Soft,
    Light,
    Stable,
    Responsive,
    GroundFeel,
    Grippy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DislikedTrait {
    TooSoft,
    TooFirm,
    Unstable,
    Heavy,
    Narrow,
    Flat,
    Slippery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Fresh,
    MidLife,
    NearEnd,
}

/// A shoe in the runner's current rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentShoe {
    pub shoe_id: String,
    #[serde(default)]
    pub run_types: Vec<RunType>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub loved: Vec<LovedTrait>,
    #[serde(default)]
    pub disliked: Vec<DislikedTrait>,
    #[serde(default)]
    pub lifecycle: Option<Lifecycle>,
}

impl CurrentShoe {
    pub fn new(shoe_id: impl Into<String>, run_types: Vec<RunType>) -> Self {
        Self {
            shoe_id: shoe_id.into(),
            run_types,
            sentiment: Sentiment::Neutral,
            loved: Vec::new(),
            disliked: Vec::new(),
            lifecycle: None,
        }
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn loving(mut self, traits: Vec<LovedTrait>) -> Self {
        self.loved = traits;
        self
    }

    pub fn disliking(mut self, traits: Vec<DislikedTrait>) -> Self {
        self.disliked = traits;
        self
    }

    pub fn at_stage(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Categories covered by the run types assigned to this shoe.
    pub fn usage_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.run_types
            .iter()
            .flat_map(|rt| rt.categories().iter().copied())
    }
}
