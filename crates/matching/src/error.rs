use thiserror::Error;

/// Failures the matching pipeline reports to its caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The catalogue has no records to match against.
    #[error("catalogue is empty")]
    EmptyCatalogue,

    /// Even after relaxation there are too few distinct candidates.
    #[error("only {found} distinct candidates found, {required} required")]
    InsufficientCandidates { found: usize, required: usize },
}

pub type Result<T> = std::result::Result<T, MatchError>;
