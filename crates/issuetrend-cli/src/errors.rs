// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to the library's structured errors and appends
//! a hint about what to try next. The library keeps the data; presentation
//! lives here.

use anyhow::Error;
use issuetrend_core::config::config_file_path;
use issuetrend_core::error::{FetchError, IssueTrendError};
use issuetrend_core::store::state_file_path;

/// Formats an error for CLI display with helpful hints.
///
/// Falls back to the plain error message when the error did not come from
/// the library.
pub fn format_error(error: &Error) -> String {
    if let Some(err) = error.downcast_ref::<IssueTrendError>() {
        match err {
            IssueTrendError::Fetch(fetch) => format_fetch_error(fetch),
            IssueTrendError::NotAuthenticated => err.to_string(),
            IssueTrendError::Config { .. } => format!(
                "{err}\n\nTip: Check your config file at {}",
                config_file_path().display()
            ),
            IssueTrendError::Store { .. } => format!(
                "{err}\n\nTip: The saved state at {} can be deleted safely.",
                state_file_path().display()
            ),
            IssueTrendError::UnknownLabel { .. } => format!(
                "{err}\n\nTip: List the repository's labels with `issuetrend labels`."
            ),
            IssueTrendError::Keyring(_) => format!(
                "{err}\n\nTip: Your system keyring may be locked. Try unlocking it and try again."
            ),
        }
    } else if let Some(fetch) = error.downcast_ref::<FetchError>() {
        format_fetch_error(fetch)
    } else {
        error.to_string()
    }
}

fn format_fetch_error(err: &FetchError) -> String {
    match err {
        FetchError::InvalidInput { .. } => format!(
            "{err}\n\nTip: Use OWNER/REPO, a repository URL, or git@host:OWNER/REPO."
        ),
        FetchError::Http { status, .. } if matches!(status, 401 | 403) => {
            format!("{err}\n\nTip: Check your GitHub token with `issuetrend auth status`.")
        }
        FetchError::Http { .. } => err.to_string(),
        FetchError::Query { .. } => format!(
            "{err}\n\nTip: Check that the repository exists and your token can read it."
        ),
        FetchError::Unknown { .. } => {
            format!("{err}\n\nTip: Check your internet connection and try again.")
        }
    }
}
