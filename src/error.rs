//! Custom error types for phasegate.
//!
//! The core deliberately has no fatal path: every hook degrades to the most
//! permissive behavior on an internal fault (permit the edit, permit the
//! stop, treat state as absent). These types exist so the few places that do
//! care about failure kind (the state store, the CLI) can report it
//! precisely.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for phasegate operations
#[derive(Error, Debug)]
pub enum PhasegateError {
    /// Workflow state could not be persisted
    #[error("Failed to write workflow state to {path}: {message}")]
    StateWrite { path: PathBuf, message: String },

    /// Lock on the state file could not be acquired
    #[error("Failed to lock workflow state at {path}: {message}")]
    StateLock { path: PathBuf, message: String },

    /// Hook payload could not be decoded
    #[error("Invalid hook payload for '{hook}': {message}")]
    Payload { hook: String, message: String },

    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhasegateError {
    /// Create a state-write error
    pub fn state_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a state-lock error
    pub fn state_lock(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateLock {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a payload error
    pub fn payload(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Payload {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Type alias for phasegate results
pub type Result<T> = std::result::Result<T, PhasegateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhasegateError::state_write("/tmp/workflow.json", "disk full");
        assert!(err.to_string().contains("/tmp/workflow.json"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_payload_error() {
        let err = PhasegateError::payload("stop", "missing field");
        if let PhasegateError::Payload { hook, message } = err {
            assert_eq!(hook, "stop");
            assert_eq!(message, "missing field");
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: PhasegateError = io_err.into();
        assert!(matches!(err, PhasegateError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
