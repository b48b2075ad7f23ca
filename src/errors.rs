//! Typed error hierarchy for the autofix service.
//!
//! Two top-level enums cover the two subsystems:
//! - `AutofixError` — issue store and intake failures
//! - `ConfigError` — configuration loading failures

use thiserror::Error;

/// Errors from the issue store and the background classification path.
#[derive(Debug, Error)]
pub enum AutofixError {
    #[error("Issue {id} not found")]
    IssueNotFound { id: String },

    /// An issue was handed to the classifier twice. Only a scheduling bug
    /// can produce this.
    #[error("Issue {id} has already been analyzed")]
    AlreadyAnalyzed { id: String },

    #[error("Issue store lock poisoned")]
    LockPoisoned,
}

/// Errors from loading or writing `autofix.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ParseFailed {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}
