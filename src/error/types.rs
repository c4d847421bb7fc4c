use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Invalid lock key {0:?}: key must not be empty or whitespace")]
    InvalidKey(String),

    #[error("Failed to acquire lock on {key}: wait was cancelled")]
    Cancelled { key: String },

    #[error("Failed to acquire lock on {key}: timeout after {timeout:?}")]
    LockTimeout { key: String, timeout: Duration },

    #[error("Invalid duration format '{input}': {message}")]
    InvalidDuration { input: String, message: String },

    #[error("Failed to start timer runtime: {0}")]
    TimerRuntime(#[source] io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl LockError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::LockTimeout { .. } => 2,
            LockError::Cancelled { .. } => 3,
            _ => 1,
        }
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        LockError::InvalidKey(key.into())
    }

    pub fn cancelled(key: impl Into<String>) -> Self {
        LockError::Cancelled { key: key.into() }
    }

    pub fn lock_timeout(key: impl Into<String>, timeout: Duration) -> Self {
        LockError::LockTimeout {
            key: key.into(),
            timeout,
        }
    }

    /// Whether this error is the cooperative-cancellation signal rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LockError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, LockError>;
