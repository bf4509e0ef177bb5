//! Error types for Chatdrop
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatdrop operations
///
/// Upload and extraction variants are reported per file and never end a
/// session. Provider variants abandon the current turn only.
#[derive(Error, Debug)]
pub enum ChatdropError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upload batch exceeded the per-batch file ceiling
    #[error("Too many files: {count} uploaded, at most {limit} are allowed per batch")]
    BatchTooLarge {
        /// Number of files in the rejected batch
        count: usize,
        /// Configured per-batch ceiling
        limit: usize,
    },

    /// A single file exceeded the size ceiling
    #[error("File {name} is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Display name of the file
        name: String,
        /// Size of the uploaded file in bytes
        size: u64,
        /// Configured per-file ceiling in bytes
        limit: u64,
    },

    /// Decoding or parsing an uploaded file failed
    #[error("Failed to extract {name}: {reason}")]
    Extraction {
        /// Display name of the file
        name: String,
        /// Human-readable failure reason
        reason: String,
    },

    /// Provider-related errors (API calls, response parsing)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Submission had neither text nor pending attachments
    #[error("Nothing to send: enter a message or attach a file")]
    EmptySubmission,

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Chatdrop operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
