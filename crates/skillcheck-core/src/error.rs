//! Error taxonomy for test resolution, sessions, and collaborators.
//!
//! Every fallible operation in the core returns [`Error`] synchronously. An
//! operation that fails never leaves a session or a store partially mutated.

use thiserror::Error;

/// Convenience alias used across the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the test engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The taker is not permitted to take this test.
    #[error("test not available: {0}")]
    Authorization(String),

    /// The resolved test has no questions.
    #[error("no questions available for {0}")]
    EmptyTest(String),

    /// The operation is not valid in the session's current phase.
    #[error("invalid state: cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: &'static str,
    },

    /// An index fell outside its allowed range.
    #[error("{what} {index} out of range (expected 0..{len})")]
    Range {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Malformed input such as an unknown language or a broken question.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced test, question, or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A collaborator failed for reasons unrelated to the request.
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Returns `true` if this error should be shown to a taker as
    /// "test unavailable" rather than treated as a programming error.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Authorization(_) | Error::NotFound(_) | Error::EmptyTest(_)
        )
    }
}
