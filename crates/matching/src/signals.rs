//! Structured external-context signals consumed by the scorer.
//!
//! Free-text chat context is classified into these records before it
//! reaches the engine; the scorer never sees raw text.

use serde::{Deserialize, Serialize};

use crate::profile::Sentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Injury {
    Achilles,
    Knee,
    Shin,
    PlantarFascia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitIssue {
    /// Toes feel cramped.
    TightToeBox,
    /// Needs a wide last.
    WideFeet,
    /// Heel lifts out of the shoe.
    HeelSlip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Climate {
    Wet,
    Hot,
    Cold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplicitRequest {
    Lighter,
    Softer,
    MoreStable,
    Bouncier,
    LowerDrop,
    Cheaper,
}

/// A classified piece of external context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextSignal {
    Injury { injury: Injury },
    Fit { issue: FitIssue },
    Climate { climate: Climate },
    Request { request: ExplicitRequest },
    /// How the runner felt about a brand they used before.
    PastShoe { brand: String, sentiment: Sentiment },
}

impl ContextSignal {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Injury { .. } => "injury",
            Self::Fit { .. } => "fit",
            Self::Climate { .. } => "climate",
            Self::Request { .. } => "request",
            Self::PastShoe { .. } => "past-shoe",
        }
    }
}
