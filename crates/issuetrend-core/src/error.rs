// SPDX-License-Identifier: Apache-2.0

//! Error types for issuetrend.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors raised while resolving a repository reference or fetching its
/// labels and issues.
///
/// Any of these aborts the whole refresh: no partial labels or issues are
/// adopted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The repository reference did not match any accepted shape.
    /// Raised before any request is sent.
    #[error("Could not find the GitHub owner name in '{input}'. Try again.")]
    InvalidInput {
        /// The rejected input.
        input: String,
    },

    /// A request came back with a non-success HTTP status.
    #[error("Failed to fetch issues: {status} {reason}. Double check your repository name.")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The HTTP exchange succeeded but the GraphQL payload carried errors.
    #[error("Failed to fetch issues: {}", .messages.first().map_or("unknown query error", String::as_str))]
    Query {
        /// Messages from the `errors` array, in response order.
        messages: Vec<String>,
    },

    /// Anything else (transport failure, malformed payload, ...).
    #[error("Failed to fetch issues. Double check the owner and repository names.")]
    Unknown {
        /// Underlying cause, kept for logs and verbose output.
        detail: String,
    },
}

impl FetchError {
    /// Builds an [`FetchError::Unknown`] from any displayable cause.
    pub fn unknown(detail: impl std::fmt::Display) -> Self {
        FetchError::Unknown {
            detail: detail.to_string(),
        }
    }
}

impl From<octocrab::Error> for FetchError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code;
                FetchError::Http {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                }
            }
            other => FetchError::unknown(other),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::unknown(format!("unexpected response shape: {err}"))
    }
}

/// Errors that can occur during issuetrend operations.
#[derive(Error, Debug)]
pub enum IssueTrendError {
    /// Fetching the repository failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// No GitHub token could be resolved.
    #[error(
        "Authentication required - run `issuetrend auth login` first, or set GITHUB_TOKEN environment variable"
    )]
    NotAuthenticated,

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Persisted state could not be read or written.
    #[error("State store error: {message}")]
    Store {
        /// Error message.
        message: String,
    },

    /// A label was requested that the repository does not define.
    #[error("Unknown label: {name}")]
    UnknownLabel {
        /// The requested label name.
        name: String,
    },

    /// Keyring/credential storage error.
    #[cfg(feature = "keyring")]
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<config::ConfigError> for IssueTrendError {
    fn from(err: config::ConfigError) -> Self {
        IssueTrendError::Config {
            message: err.to_string(),
        }
    }
}
