//! Store error types.
//!
//! These are failures specific to the in-memory stores. They are converted
//! into the core [`skillcheck_core::Error`] at the trait boundary so the
//! engine can classify them without string matching.

use thiserror::Error;

/// Errors raised inside the in-memory stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the store lock.
    #[error("{store} lock poisoned")]
    LockPoisoned { store: &'static str },

    /// An insert collided with an existing id.
    #[error("{kind} {id} already exists")]
    DuplicateId { kind: &'static str, id: String },
}

impl From<StoreError> for skillcheck_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateId { .. } => skillcheck_core::Error::InvalidArgument(err.to_string()),
            StoreError::LockPoisoned { .. } => skillcheck_core::Error::Store(err.to_string()),
        }
    }
}
