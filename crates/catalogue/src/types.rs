use serde::{Deserialize, Serialize};
use std::fmt;

/// Intended use class of a shoe.
///
/// `Daily` doubles as the default versatile category used whenever the
/// engine has nothing more specific to aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Everyday training shoe.
    Daily,
    /// Protective shoe for easy and recovery days.
    Recovery,
    /// Responsive shoe for tempo and interval sessions.
    Workout,
    /// Race-day shoe.
    Race,
    /// Off-road shoe.
    Trail,
}

impl Category {
    /// Every category in taxonomy order.
    pub const ALL: [Category; 5] = [
        Category::Daily,
        Category::Recovery,
        Category::Workout,
        Category::Race,
        Category::Trail,
    ];

    /// The category used when a runner has nothing else to aim for.
    pub const DEFAULT_VERSATILE: Category = Category::Daily;

    /// Returns a stable label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Daily => "daily",
            Category::Recovery => "recovery",
            Category::Workout => "workout",
            Category::Race => "race",
            Category::Trail => "trail",
        }
    }

    /// Road categories are everything except trail.
    pub fn is_road(&self) -> bool {
        !matches!(self, Category::Trail)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "versatile" | "daily_trainer" => Ok(Self::Daily),
            "recovery" | "easy" => Ok(Self::Recovery),
            "workout" | "tempo" | "speed" => Ok(Self::Workout),
            "race" | "racing" => Ok(Self::Race),
            "trail" => Ok(Self::Trail),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// Category membership flags carried by each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFlags {
    pub daily: bool,
    pub recovery: bool,
    pub workout: bool,
    pub race: bool,
    pub trail: bool,
    /// Shoe that comfortably covers daily, recovery and workout duty.
    pub super_versatile: bool,
}

impl CategoryFlags {
    /// Whether the flag for `category` itself is set.
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Daily => self.daily,
            Category::Recovery => self.recovery,
            Category::Workout => self.workout,
            Category::Race => self.race,
            Category::Trail => self.trail,
        }
    }

    /// Whether the shoe can serve `category`, letting the super-versatile
    /// flag stand in for the non-race road categories.
    pub fn satisfies(&self, category: Category) -> bool {
        if self.has(category) {
            return true;
        }
        self.super_versatile
            && matches!(
                category,
                Category::Daily | Category::Recovery | Category::Workout
            )
    }

    /// Flags that are set, in taxonomy order.
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// True for any road category flag (super-versatile counts as road).
    pub fn has_road(&self) -> bool {
        self.daily || self.recovery || self.workout || self.race || self.super_versatile
    }

    /// Trail is the shoe's only category.
    pub fn is_trail_only(&self) -> bool {
        self.trail && !self.has_road()
    }

    /// Race is the shoe's only road category.
    pub fn is_race_only(&self) -> bool {
        self.race && !self.daily && !self.recovery && !self.workout && !self.super_versatile
    }
}

/// One of the six feel dimensions scored 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeelDimension {
    Cushion,
    Bounce,
    Stability,
    Rocker,
    GroundFeel,
    WeightFeel,
}

impl FeelDimension {
    /// All six dimensions.
    pub const ALL: [FeelDimension; 6] = [
        FeelDimension::Cushion,
        FeelDimension::Bounce,
        FeelDimension::Stability,
        FeelDimension::Rocker,
        FeelDimension::GroundFeel,
        FeelDimension::WeightFeel,
    ];

    /// Dimensions compared when clustering similar-feeling shoes.
    pub const CORE: [FeelDimension; 4] = [
        FeelDimension::Cushion,
        FeelDimension::Bounce,
        FeelDimension::Stability,
        FeelDimension::Rocker,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeelDimension::Cushion => "cushion",
            FeelDimension::Bounce => "bounce",
            FeelDimension::Stability => "stability",
            FeelDimension::Rocker => "rocker",
            FeelDimension::GroundFeel => "ground feel",
            FeelDimension::WeightFeel => "weight feel",
        }
    }
}

/// Feel scores, each 1-5. `weight_feel` runs from 1 (featherlight) to 5 (heavy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeelScores {
    pub cushion: u8,
    pub bounce: u8,
    pub stability: u8,
    pub rocker: u8,
    pub ground_feel: u8,
    pub weight_feel: u8,
}

impl FeelScores {
    pub fn get(&self, dimension: FeelDimension) -> u8 {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
            FeelDimension::WeightFeel => self.weight_feel,
        }
    }

    /// First dimension whose score lies outside 1-5, if any.
    pub fn out_of_range(&self) -> Option<(FeelDimension, u8)> {
        FeelDimension::ALL
            .into_iter()
            .map(|d| (d, self.get(d)))
            .find(|(_, v)| !(1..=5).contains(v))
    }
}

/// Midsole plate construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateMaterial {
    #[default]
    None,
    Plastic,
    Nylon,
    Carbon,
}

impl PlateMaterial {
    pub fn is_present(&self) -> bool {
        !matches!(self, PlateMaterial::None)
    }
}

/// Measured construction specs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    pub weight_g: u32,
    pub heel_drop_mm: f32,
    #[serde(default)]
    pub plate: PlateMaterial,
}

impl Specs {
    pub fn drop_bucket(&self) -> DropBucket {
        DropBucket::from_mm(self.heel_drop_mm)
    }
}

/// Coarse heel-to-toe drop bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropBucket {
    /// Under 3 mm.
    Zero,
    /// 3-5 mm.
    Low,
    /// 6-8 mm.
    Medium,
    /// 9-11 mm.
    High,
    /// 12 mm and up.
    VeryHigh,
}

impl DropBucket {
    pub fn from_mm(mm: f32) -> Self {
        let mm = mm.round();
        if mm < 3.0 {
            DropBucket::Zero
        } else if mm < 6.0 {
            DropBucket::Low
        } else if mm < 9.0 {
            DropBucket::Medium
        } else if mm < 12.0 {
            DropBucket::High
        } else {
            DropBucket::VeryHigh
        }
    }

    fn index(&self) -> usize {
        match self {
            DropBucket::Zero => 0,
            DropBucket::Low => 1,
            DropBucket::Medium => 2,
            DropBucket::High => 3,
            DropBucket::VeryHigh => 4,
        }
    }

    /// Number of buckets between `self` and `other` (0-4).
    pub fn distance(&self, other: DropBucket) -> usize {
        self.index().abs_diff(other.index())
    }

    pub fn label(&self) -> &'static str {
        match self {
            DropBucket::Zero => "zero drop",
            DropBucket::Low => "low drop",
            DropBucket::Medium => "medium drop",
            DropBucket::High => "high drop",
            DropBucket::VeryHigh => "very high drop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToeBox {
    Narrow,
    #[default]
    Standard,
    Roomy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volume {
    Low,
    #[default]
    Standard,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Width {
    Standard,
    Wide,
    ExtraWide,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    #[default]
    Neutral,
    Stability,
    MaxStability,
}

/// Fit descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fit {
    pub toe_box: ToeBox,
    pub volume: Volume,
    pub widths: Vec<Width>,
    pub support: Support,
}

impl Default for Fit {
    fn default() -> Self {
        Self {
            toe_box: ToeBox::Standard,
            volume: Volume::Standard,
            widths: vec![Width::Standard],
            support: Support::Neutral,
        }
    }
}

impl Fit {
    pub fn offers_wide(&self) -> bool {
        self.widths
            .iter()
            .any(|w| matches!(w, Width::Wide | Width::ExtraWide))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    #[default]
    Road,
    Trail,
    Mixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WetGrip {
    Poor,
    #[default]
    Average,
    Good,
}

/// Market availability of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    /// Recently released.
    New,
    /// Widely available.
    #[default]
    Available,
    /// Limited sizes or regions.
    Limited,
    /// No longer produced.
    Discontinued,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    #[default]
    Mid,
    Premium,
}

/// Surface, grip and market metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub surface: Surface,
    pub wet_grip: WetGrip,
    pub release: ReleaseStatus,
    pub price_tier: PriceTier,
}

/// Free-text descriptive fields, used for fallback bullets and prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptions {
    pub feel_notes: String,
    pub who_its_for: String,
    pub notable_detail: String,
    pub common_issues: Vec<String>,
}

/// A catalogue entry. Owned by the catalogue and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoeRecord {
    pub id: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub categories: CategoryFlags,
    pub feel: FeelScores,
    pub specs: Specs,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub descriptions: Descriptions,
}

impl ShoeRecord {
    /// Brand, model and version joined for display.
    pub fn display_name(&self) -> String {
        match self.version.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => format!("{} {} {}", self.brand, self.model, version),
            None => format!("{} {}", self.brand, self.model),
        }
    }
}
