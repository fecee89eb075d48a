//! Error types for the automation surface

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors surfaced by a page driver backend
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// Browser process could not be launched or attached
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Navigation failed or the target was unreachable
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A bounded wait elapsed without the page settling
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// An element operation failed (detached node, stale handle)
    #[error("Element operation failed: {0}")]
    Element(String),

    /// Script evaluation failed or returned an unusable value
    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    /// Backend protocol or transport error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DriverError {
    /// Whether a retry at a higher layer could plausibly succeed.
    ///
    /// Advisory only: the retry policy deliberately treats every failure
    /// as transient (see the pacing crate).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::Navigation(_)
                | DriverError::WaitTimeout(_)
                | DriverError::Element(_)
                | DriverError::Backend(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_detail() {
        let err = DriverError::Navigation("connection refused".to_string());
        assert_eq!(err.to_string(), "Navigation failed: connection refused");
    }

    #[test]
    fn launch_is_not_retryable() {
        assert!(!DriverError::Launch("no chromium".to_string()).is_retryable());
        assert!(DriverError::WaitTimeout("idle".to_string()).is_retryable());
    }
}
