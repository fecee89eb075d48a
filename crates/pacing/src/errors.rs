//! Error types for the retry layer

use thiserror::Error;

/// Terminal outcomes of a retry loop.
#[derive(Debug, Error, Clone)]
pub enum RetryError {
    /// Every attempt failed; carries the last failure detail.
    #[error("'{label}' exhausted after {attempts} attempts: {last}")]
    Exhausted {
        label: String,
        attempts: u32,
        last: String,
    },

    /// Cancellation was observed between attempts.
    #[error("'{label}' cancelled between attempts")]
    Cancelled { label: String },
}

impl RetryError {
    /// Last failure detail, when the loop was exhausted.
    pub fn last_detail(&self) -> Option<&str> {
        match self {
            RetryError::Exhausted { last, .. } => Some(last),
            RetryError::Cancelled { .. } => None,
        }
    }
}
