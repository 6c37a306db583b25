// SPDX-License-Identifier: Apache-2.0

//! Text utility functions shared by front ends.

use chrono::{DateTime, Utc};

/// Truncates text to a maximum length with a custom suffix.
///
/// Uses character count (not byte count) to safely handle multi-byte UTF-8.
/// The suffix is included in the max length calculation.
///
/// # Examples
///
/// ```
/// use issuetrend_core::utils::truncate_with_suffix;
///
/// let result = truncate_with_suffix("good first issue", 10, "~");
/// assert_eq!(result, "good firs~");
/// ```
#[must_use]
pub fn truncate_with_suffix(text: &str, max_len: usize, suffix: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncate_at = max_len.saturating_sub(suffix.chars().count());
    let truncated: String = text.chars().take(truncate_at).collect();
    format!("{truncated}{suffix}")
}

/// Truncates text to a maximum length with the suffix "...".
///
/// # Examples
///
/// ```
/// use issuetrend_core::utils::truncate;
///
/// assert_eq!(truncate("bug", 10), "bug");
/// assert_eq!(truncate("needs-reproduction", 10), "needs-r...");
/// ```
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    truncate_with_suffix(text, max_len, "...")
}

/// Formats a sample instant for tables: the date alone at midnight UTC,
/// date and time otherwise.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    if instant.time() == chrono::NaiveTime::MIN {
        instant.format("%Y-%m-%d").to_string()
    } else {
        instant.format("%Y-%m-%d %H:%M").to_string()
    }
}
