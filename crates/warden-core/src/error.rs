//! Error types for the Prompt Warden core.

use thiserror::Error;

/// Core error type for pipeline construction and execution.
///
/// Nothing here escapes [`SecurityWrapper::process`]; the orchestrator
/// catches every variant at its boundary and reports it as an error
/// outcome. Construction (`SecurityWrapper::new`) is the one place these
/// surface directly.
///
/// [`SecurityWrapper::process`]: crate::SecurityWrapper::process
#[derive(Debug, Error)]
pub enum GuardError {
    /// Detector construction or execution failed.
    #[error("detector fault: {0}")]
    Detector(#[from] warden_detect::DetectError),

    /// Sanitizer construction failed.
    #[error("sanitizer fault: {0}")]
    Sanitizer(#[from] warden_sanitize::SanitizeError),

    /// Internal error (poisoned lock, invariant breach).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Core result type for warden operations.
pub type Result<T> = std::result::Result<T, GuardError>;
