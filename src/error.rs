//! Error types for the audit worker.
//!
//! Mirrors the failure classes a task can hit: missing input, provider
//! failures, storage failures, unparseable artifacts and downstream
//! reporting failures.

/// Result alias used by the worker modules.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Main worker error type.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A required task input was not supplied.
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    /// The task named an operation this worker does not handle.
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// The audit provider failed or returned an unusable response.
    #[error("audit provider error: {0}")]
    Provider(String),

    /// An artifact store read or write failed.
    #[error("storage error for {key}: {message}")]
    Storage {
        /// Key being read or written
        key: String,
        /// Backend failure description
        message: String,
    },

    /// A stored artifact is not a valid audit document.
    #[error("failed to parse artifact {key}: {message}")]
    Parse {
        /// Key of the artifact
        key: String,
        /// Why it was rejected
        message: String,
    },

    /// The downstream report call failed.
    #[error("downstream report failed: {0}")]
    Report(String),

    /// Serializing a payload failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkerError {
    /// Build a storage error for the given key.
    pub fn storage(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Build a parse error for the given key.
    pub fn parse(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WorkerError::MissingInput("url").to_string(),
            "missing required input: url"
        );
        assert_eq!(
            WorkerError::storage("scans/2024/1/a.json", "not found").to_string(),
            "storage error for scans/2024/1/a.json: not found"
        );
    }
}
