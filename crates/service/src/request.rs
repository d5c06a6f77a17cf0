//! Inbound request contract and outbound response shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use stride_catalogue::FeelDimension;
use stride_matching::{
    AnalysisOutcome, AnalysisQuery, CategoryRequest, ContextSignal, CurrentShoe, DiscoveryOutcome,
    DiscoveryQuery, DropPreference, FeelPreferences, Gap, RunnerProfile,
};

use crate::error::RequestError;
use crate::signals::push_unique;

/// Most categories one discovery request may ask for.
pub const MAX_DISCOVERY_REQUESTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    GapDetection,
    Discovery,
    Analysis,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::GapDetection => "gap_detection",
            Self::Discovery => "discovery",
            Self::Analysis => "analysis",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gap_detection" => Ok(Self::GapDetection),
            "discovery" => Ok(Self::Discovery),
            "analysis" => Ok(Self::Analysis),
            other => Err(RequestError::UnsupportedMode(other.to_string())),
        }
    }
}

/// The JSON payload as received, before validation.
///
/// `mode` stays a string so an unknown value is reported as an
/// unsupported mode rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequest {
    pub mode: Option<String>,
    pub profile: Option<RunnerProfile>,
    pub current_shoes: Vec<CurrentShoe>,
    pub gap: Option<Gap>,
    pub feel: FeelPreferences,
    pub heel_drop: DropPreference,
    pub requests: Vec<CategoryRequest>,
    /// Signals already classified by the caller.
    pub context: Vec<ContextSignal>,
    /// Free text, classified by the service before matching.
    pub chat_context: Option<String>,
}

impl RawRequest {
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        serde_json::from_str(body).map_err(|e| RequestError::Validation(e.to_string()))
    }

    pub fn mode(&self) -> Result<Mode, RequestError> {
        self.mode
            .as_deref()
            .ok_or_else(|| RequestError::Validation("mode is required".into()))?
            .parse()
    }

    /// Checks ranges and mode-specific fields, then builds the typed request.
    ///
    /// `classified` holds signals derived from `chat_context`; they are
    /// merged after the caller-supplied `context`.
    pub fn into_request(
        self,
        classified: Vec<ContextSignal>,
    ) -> Result<MatchRequest, RequestError> {
        let mode = self.mode()?;
        let profile = self
            .profile
            .ok_or_else(|| RequestError::Validation("profile is required".into()))?;
        validate_rotation(&self.current_shoes)?;

        let mut signals = self.context;
        for signal in classified {
            push_unique(&mut signals, signal);
        }

        match mode {
            Mode::GapDetection => Ok(MatchRequest::GapDetection {
                profile,
                current_shoes: self.current_shoes,
            }),
            Mode::Analysis => {
                validate_feel("feel", &self.feel)?;
                validate_drop("heel_drop", &self.heel_drop)?;
                Ok(MatchRequest::Analysis(AnalysisQuery {
                    profile,
                    current_shoes: self.current_shoes,
                    gap: self.gap,
                    feel: self.feel,
                    heel_drop: self.heel_drop,
                    signals,
                }))
            }
            Mode::Discovery => {
                if self.requests.is_empty() || self.requests.len() > MAX_DISCOVERY_REQUESTS {
                    return Err(RequestError::Validation(format!(
                        "discovery needs 1-{MAX_DISCOVERY_REQUESTS} requests, got {}",
                        self.requests.len()
                    )));
                }
                for (i, request) in self.requests.iter().enumerate() {
                    validate_feel(&format!("requests[{i}].feel"), &request.feel)?;
                    validate_drop(&format!("requests[{i}].heel_drop"), &request.heel_drop)?;
                }
                Ok(MatchRequest::Discovery(DiscoveryQuery {
                    profile,
                    current_shoes: self.current_shoes,
                    requests: self.requests,
                    signals,
                }))
            }
        }
    }
}

fn validate_feel(field: &str, feel: &FeelPreferences) -> Result<(), RequestError> {
    match feel.invalid_explicit() {
        Some((dimension, value)) => Err(RequestError::Validation(format!(
            "{field}.{} must be between 1 and 5, got {value}",
            dimension_key(dimension)
        ))),
        None => Ok(()),
    }
}

fn dimension_key(dimension: FeelDimension) -> &'static str {
    match dimension {
        FeelDimension::Cushion => "cushion",
        FeelDimension::Bounce => "bounce",
        FeelDimension::Stability => "stability",
        FeelDimension::Rocker => "rocker",
        FeelDimension::GroundFeel => "ground_feel",
        FeelDimension::WeightFeel => "weight_feel",
    }
}

fn validate_drop(field: &str, heel_drop: &DropPreference) -> Result<(), RequestError> {
    if matches!(heel_drop, DropPreference::Explicit(buckets) if buckets.is_empty()) {
        return Err(RequestError::Validation(format!(
            "{field} is explicit but selects no buckets"
        )));
    }
    Ok(())
}

fn validate_rotation(current: &[CurrentShoe]) -> Result<(), RequestError> {
    let mut seen = BTreeSet::new();
    for shoe in current {
        if shoe.shoe_id.trim().is_empty() {
            return Err(RequestError::Validation(
                "current_shoes entries need a shoe_id".into(),
            ));
        }
        if !seen.insert(shoe.shoe_id.as_str()) {
            return Err(RequestError::Validation(format!(
                "shoe '{}' appears twice in current_shoes",
                shoe.shoe_id
            )));
        }
    }
    Ok(())
}

/// A validated request, one variant per mode.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRequest {
    GapDetection {
        profile: RunnerProfile,
        current_shoes: Vec<CurrentShoe>,
    },
    Discovery(DiscoveryQuery),
    Analysis(AnalysisQuery),
}

impl MatchRequest {
    pub fn mode(&self) -> Mode {
        match self {
            Self::GapDetection { .. } => Mode::GapDetection,
            Self::Discovery(_) => Mode::Discovery,
            Self::Analysis(_) => Mode::Analysis,
        }
    }
}

/// Successful response payload. Serializes without a wrapper tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchResponse {
    Gap { gap: Gap },
    Discovery { results: Vec<DiscoveryOutcome> },
    Analysis(AnalysisOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_catalogue::{Category, DropBucket};
    use stride_matching::{Experience, Injury, Preference};

    const PROFILE: &str = r#""profile":{"experience":"intermediate","primary_goal":"general_fitness","training_pattern":"mostly_easy"}"#;

    fn parse(body: &str) -> RawRequest {
        RawRequest::from_json(body).unwrap()
    }

    /// Parses `{<profile>, <fields>}`.
    fn with_profile(fields: &str) -> RawRequest {
        parse(&format!("{{{PROFILE},{fields}}}"))
    }

    #[test]
    fn test_minimal_analysis_request() {
        let request = with_profile(r#""mode":"analysis""#)
            .into_request(vec![])
            .unwrap();
        match request {
            MatchRequest::Analysis(query) => {
                assert!(query.gap.is_none());
                assert!(query.current_shoes.is_empty());
                assert_eq!(query.profile.experience, Experience::Intermediate);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_missing_profile_is_validation_error() {
        for mode in ["analysis", "gap_detection", "discovery"] {
            let body = format!(r#"{{"mode":"{mode}","current_shoes":[],"requests":[{{"category":"race"}}]}}"#);
            let err = parse(&body).into_request(vec![]).unwrap_err();
            assert_eq!(err, RequestError::Validation("profile is required".into()));
            assert_eq!(err.status(), 400);
        }
    }

    #[test]
    fn test_incomplete_profile_fails_to_parse() {
        let err = RawRequest::from_json(r#"{"mode":"analysis","profile":{"experience":"beginner"}}"#)
            .unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
    }

    #[test]
    fn test_missing_mode_is_validation_error() {
        let err = parse("{}").into_request(vec![]).unwrap_err();
        assert_eq!(err, RequestError::Validation("mode is required".into()));
    }

    #[test]
    fn test_unknown_mode_is_unsupported() {
        let err = with_profile(r#""mode":"compare""#)
            .into_request(vec![])
            .unwrap_err();
        assert_eq!(err, RequestError::UnsupportedMode("compare".into()));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        let err = RawRequest::from_json(r#"{"mode": "analysis", "feel": 3}"#).unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
    }

    #[test]
    fn test_out_of_range_feel_is_rejected() {
        let body = r#""mode":"analysis","feel":{"cushion":{"mode":"explicit","value":7}}"#;
        let err = with_profile(body).into_request(vec![]).unwrap_err();
        assert_eq!(
            err,
            RequestError::Validation("feel.cushion must be between 1 and 5, got 7".into())
        );
    }

    #[test]
    fn test_discovery_request_count_bounds() {
        let err = with_profile(r#""mode":"discovery""#)
            .into_request(vec![])
            .unwrap_err();
        assert!(err.to_string().contains("1-3 requests, got 0"));

        let four = r#""mode":"discovery","requests":[
            {"category":"daily"},{"category":"race"},{"category":"trail"},{"category":"recovery"}
        ]"#;
        let err = with_profile(four).into_request(vec![]).unwrap_err();
        assert!(err.to_string().contains("got 4"));
    }

    #[test]
    fn test_discovery_request_feel_is_checked() {
        let body = r#""mode":"discovery","requests":[
            {"category":"race"},
            {"category":"daily","feel":{"bounce":{"mode":"explicit","value":0}}}
        ]"#;
        let err = with_profile(body).into_request(vec![]).unwrap_err();
        assert!(err.to_string().contains("requests[1].feel.bounce"));
    }

    #[test]
    fn test_discovery_parses_categories_and_drop() {
        let body = r#""mode":"discovery","requests":[
            {"category":"trail","heel_drop":{"mode":"explicit","buckets":["low","medium"]}}
        ]"#;
        match with_profile(body).into_request(vec![]).unwrap() {
            MatchRequest::Discovery(query) => {
                assert_eq!(query.requests[0].category, Category::Trail);
                assert_eq!(
                    query.requests[0].heel_drop,
                    DropPreference::Explicit(vec![DropBucket::Low, DropBucket::Medium])
                );
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_empty_explicit_drop_is_rejected() {
        let body = r#""mode":"analysis","heel_drop":{"mode":"explicit","buckets":[]}"#;
        assert!(with_profile(body).into_request(vec![]).is_err());
    }

    #[test]
    fn test_duplicate_rotation_entries_are_rejected() {
        let body = r#""mode":"gap_detection","current_shoes":[
            {"shoe_id":"a"},{"shoe_id":"a"}
        ]"#;
        let err = with_profile(body).into_request(vec![]).unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_classified_signals_merge_after_context() {
        let body = r#""mode":"analysis","context":[{"kind":"injury","injury":"knee"}]"#;
        let classified = vec![
            ContextSignal::Injury {
                injury: Injury::Knee,
            },
            ContextSignal::Injury {
                injury: Injury::Shin,
            },
        ];
        match with_profile(body).into_request(classified).unwrap() {
            MatchRequest::Analysis(query) => assert_eq!(query.signals.len(), 2),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_explicit_values_survive_parsing() {
        let body = r#""mode":"analysis","feel":{"cushion":{"mode":"explicit","value":5},"rocker":{"mode":"ignore"}}"#;
        match with_profile(body).into_request(vec![]).unwrap() {
            MatchRequest::Analysis(query) => {
                assert_eq!(query.feel.cushion, Preference::Explicit(5));
                assert_eq!(query.feel.rocker, Preference::Ignore);
                assert_eq!(query.feel.bounce, Preference::DecideForMe);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }
}
