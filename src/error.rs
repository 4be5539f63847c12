//! Error types shared across the roulette engine

use thiserror::Error;

/// Everything that can go wrong in the engine.
///
/// Precondition refusals (spinning with too few names, spinning while
/// already in motion) are not errors; those calls simply return `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouletteError {
    #[error("need at least {min} participants, have {have}")]
    TooFewParticipants { have: usize, min: usize },

    #[error("weight vector has {weights} entries for {items} participants")]
    LayoutMismatch { items: usize, weights: usize },

    #[error("every participant has zero weight")]
    AllExcluded,

    #[error("excluding {0:?} would leave nobody selectable")]
    CannotExclude(String),

    #[error("non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for RouletteError {
    fn from(err: serde_json::Error) -> Self {
        RouletteError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for RouletteError {
    fn from(err: std::io::Error) -> Self {
        RouletteError::Io(err.to_string())
    }
}
