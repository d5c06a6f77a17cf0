//! Tri-state feel and heel-drop preferences.

use serde::{Deserialize, Serialize};
use stride_catalogue::{DropBucket, FeelDimension};

/// How the runner wants one feel dimension handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Preference {
    /// Use the requested category's acceptable range.
    #[default]
    DecideForMe,
    /// Target an exact 1-5 value.
    Explicit(u8),
    /// This dimension does not matter.
    Ignore,
}

impl Preference {
    pub fn explicit_value(&self) -> Option<u8> {
        match self {
            Self::Explicit(v) => Some(*v),
            _ => None,
        }
    }
}

/// One preference per feel dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeelPreferences {
    pub cushion: Preference,
    pub bounce: Preference,
    pub stability: Preference,
    pub rocker: Preference,
    pub ground_feel: Preference,
    pub weight_feel: Preference,
}

impl FeelPreferences {
    /// Every dimension set to [`Preference::Ignore`].
    pub fn ignore_all() -> Self {
        Self {
            cushion: Preference::Ignore,
            bounce: Preference::Ignore,
            stability: Preference::Ignore,
            rocker: Preference::Ignore,
            ground_feel: Preference::Ignore,
            weight_feel: Preference::Ignore,
        }
    }

    pub fn get(&self, dimension: FeelDimension) -> Preference {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
            FeelDimension::WeightFeel => self.weight_feel,
        }
    }

    pub fn set(&mut self, dimension: FeelDimension, preference: Preference) {
        let slot = match dimension {
            FeelDimension::Cushion => &mut self.cushion,
            FeelDimension::Bounce => &mut self.bounce,
            FeelDimension::Stability => &mut self.stability,
            FeelDimension::Rocker => &mut self.rocker,
            FeelDimension::GroundFeel => &mut self.ground_feel,
            FeelDimension::WeightFeel => &mut self.weight_feel,
        };
        *slot = preference;
    }

    /// Builder form of [`FeelPreferences::set`].
    pub fn with(mut self, dimension: FeelDimension, preference: Preference) -> Self {
        self.set(dimension, preference);
        self
    }

    /// First explicit value outside 1-5, if any.
    pub fn invalid_explicit(&self) -> Option<(FeelDimension, u8)> {
        FeelDimension::ALL.into_iter().find_map(|d| {
            self.get(d)
                .explicit_value()
                .filter(|v| !(1..=5).contains(v))
                .map(|v| (d, v))
        })
    }
}

/// Heel-drop preference: same tri-state shape, carrying buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "buckets", rename_all = "snake_case")]
pub enum DropPreference {
    #[default]
    DecideForMe,
    Explicit(Vec<DropBucket>),
    Ignore,
}

impl DropPreference {
    /// Smallest bucket distance from `bucket` to any selected bucket.
    ///
    /// `None` when no explicit buckets are selected.
    pub fn best_distance(&self, bucket: DropBucket) -> Option<usize> {
        match self {
            Self::Explicit(buckets) => buckets.iter().map(|b| b.distance(bucket)).min(),
            _ => None,
        }
    }
}
