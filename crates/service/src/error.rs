use serde::Serialize;
use stride_catalogue::CatalogueError;
use stride_matching::MatchError;
use thiserror::Error;

/// Failures reported to the caller of a matching request.
///
/// Each variant maps to one status code. Text-generation problems never
/// show up here; they degrade to fallback bullets inside the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Malformed payload or a value outside its allowed range.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("unsupported mode '{0}' (expected gap_detection, discovery or analysis)")]
    UnsupportedMode(String),

    /// The catalogue could not be loaded or is empty.
    #[error("catalogue unavailable: {0}")]
    DataUnavailable(String),

    /// Too few distinct shoes survived relaxation. The caller may retry
    /// with looser preferences.
    #[error("only {found} distinct candidates found, {required} required")]
    InsufficientCandidates { found: usize, required: usize },

    /// Anything unexpected. Details are logged, never returned.
    #[error("internal error while matching shoes")]
    Internal,
}

impl RequestError {
    /// HTTP-style status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnsupportedMode(_) => 400,
            Self::InsufficientCandidates { .. } => 422,
            Self::Internal => 500,
            Self::DataUnavailable(_) => 503,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UnsupportedMode(_) => "unsupported_mode",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::InsufficientCandidates { .. } => "insufficient_candidates",
            Self::Internal => "internal",
        }
    }

    /// Whether retrying with relaxed inputs can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientCandidates { .. })
    }

    pub fn body(&self) -> ErrorBody {
        let (found, required) = match self {
            Self::InsufficientCandidates { found, required } => (Some(*found), Some(*required)),
            _ => (None, None),
        };
        ErrorBody {
            status: self.status(),
            code: self.code(),
            message: self.to_string(),
            recoverable: self.is_recoverable(),
            found,
            required,
        }
    }
}

/// JSON error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<usize>,
}

impl From<MatchError> for RequestError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::EmptyCatalogue => Self::DataUnavailable(err.to_string()),
            MatchError::InsufficientCandidates { found, required } => {
                Self::InsufficientCandidates { found, required }
            }
        }
    }
}

impl From<CatalogueError> for RequestError {
    fn from(err: CatalogueError) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
