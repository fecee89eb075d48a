//! Session-level errors

use page_adapter::DriverError;
use thiserror::Error;

/// Errors surfaced to the caller of a scraping session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Browser acquisition or release failed.
    #[error("browser: {0}")]
    Driver(#[from] DriverError),

    /// Login exhausted its attempts; the session must not search.
    #[error("authentication failed: {0}")]
    AuthFailed(String),
}
