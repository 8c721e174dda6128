//! Error types for the rules engine.
//!
//! Rejected commands never mutate the game: the engine restores its
//! pre-command snapshot before returning any of these.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Wrong phase, stale index, unreachable zone, no actions left.
    #[error("Illegal command: {0}")]
    IllegalCommand(String),

    /// The answer does not fit the open choice. The choice stays open.
    #[error("Invalid choice answer: {0}")]
    InvalidChoiceAnswer(String),

    /// Setup referenced unknown cards/zones or broke a state invariant.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A card or zone script is malformed.
    #[error("Script error: {0}")]
    Script(String),

    /// Nested effects went deeper than the configured limit.
    #[error("Effect chain exceeded maximum depth of {0}")]
    ChainDepthExceeded(usize),
}

impl EngineError {
    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalCommand(msg.into())
    }

    pub(crate) fn invalid_answer(msg: impl Into<String>) -> Self {
        Self::InvalidChoiceAnswer(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::illegal("no card at index 3");
        assert_eq!(err.to_string(), "Illegal command: no card at index 3");

        let err = EngineError::ChainDepthExceeded(32);
        assert_eq!(err.to_string(), "Effect chain exceeded maximum depth of 32");
    }
}
