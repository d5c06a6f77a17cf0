//! Running-shoe matching for the stride recommender.
//!
//! This crate provides:
//! - Rotation analysis and single-gap detection from a runner's current shoes.
//! - A table-driven additive scorer with staged constraint relaxation.
//! - Diverse triple selection with badges, positions and comparative claims.
//! - The [`BulletWriter`] seam for external prose, with deterministic fallbacks.
//!
//! # Examples
//!
//! ```
//! use stride_catalogue::Catalogue;
//! use stride_matching::{AnalysisQuery, MatchEngine, OfflineWriter};
//!
//! let json = r#"[
//!   {"id": "a", "brand": "A", "model": "One", "categories": {"daily": true},
//!    "feel": {"cushion": 3, "bounce": 3, "stability": 3, "rocker": 3, "ground_feel": 3, "weight_feel": 3},
//!    "specs": {"weight_g": 250, "heel_drop_mm": 8.0}},
//!   {"id": "b", "brand": "B", "model": "Two", "categories": {"daily": true},
//!    "feel": {"cushion": 4, "bounce": 3, "stability": 3, "rocker": 3, "ground_feel": 2, "weight_feel": 3},
//!    "specs": {"weight_g": 270, "heel_drop_mm": 8.0}},
//!   {"id": "c", "brand": "C", "model": "Three", "categories": {"daily": true},
//!    "feel": {"cushion": 5, "bounce": 5, "stability": 2, "rocker": 4, "ground_feel": 1, "weight_feel": 4},
//!    "specs": {"weight_g": 310, "heel_drop_mm": 6.0}}
//! ]"#;
//! let catalogue = Catalogue::from_json_str(json).unwrap();
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let outcome = runtime
//!     .block_on(MatchEngine::default().recommend(&catalogue, &AnalysisQuery::default(), &OfflineWriter))
//!     .unwrap();
//! assert_eq!(outcome.recommendations.len(), 3);
//! ```

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod gap;
pub mod preference;
pub mod profile;
pub mod recommend;
pub mod rotation;
pub mod signals;
pub mod table;

pub use engine::{
    AnalysisOutcome, AnalysisQuery, CategoryRequest, DiscoveryOutcome, DiscoveryQuery,
    MatchEngine, Ranking,
};
pub use error::{MatchError, Result};
pub use gap::{detect_gap, Gap, GapKind, Severity, Tier};
pub use preference::{DropPreference, FeelPreferences, Preference};
pub use profile::{
    BrandFilter, CurrentShoe, DislikedTrait, Experience, FootStrike, Lifecycle, LovedTrait,
    PrimaryGoal, RunType, RunnerProfile, Sentiment, TrailFrequency, TrainingPattern,
};
pub use recommend::{
    Badge, BulletPrompt, BulletSource, BulletWriter, Constraints, OfflineWriter, Position,
    RecommendedShoe, RelaxationStage, ScoreBreakdown, ScoredCandidate, Scorer, SelectionRole,
    ShoeScorer, ShoeView,
};
pub use rotation::{analyze_rotation, RotationAnalysis};
pub use signals::{Climate, ContextSignal, ExplicitRequest, FitIssue, Injury};
pub use table::ScoringTable;
