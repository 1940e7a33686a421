//! Domain error types
//!
//! Collectors, the store and the API client return these; the command layer
//! wraps them in `anyhow` and decides whether a failure is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while querying git
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Commit count must be a positive integer, got {0}")]
    InvalidCommitCount(usize),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to run git (is it installed?): {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failures of the note store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot create storage directory {path}: {source}")]
    StoragePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {reason}")]
    InvalidSettings { path: PathBuf, reason: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize store data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures of the interpretation API client
#[derive(Error, Debug)]
pub enum AiError {
    #[error("No API key configured. Run `waypoint config set apiKey <key>`")]
    MissingApiKey,

    #[error("Rate limited by the interpretation API (HTTP 429), try again later")]
    RateLimited,

    #[error("Interpretation API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Interpretation API returned no choices")]
    NoChoices,

    #[error("Interpretation API returned malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Interpretation is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Interpretation field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Network error contacting interpretation API: {0}")]
    Network(String),
}

/// Invalid settings keys or values
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Unknown config key `{0}` (expected apiKey, maxCommits, model or aiEnabled)")]
    UnknownKey(String),

    #[error("Invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}
