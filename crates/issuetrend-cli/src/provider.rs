// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.

use issuetrend_core::auth::TokenProvider;
use issuetrend_core::github::auth::resolve_token;
use secrecy::SecretString;
use tracing::debug;

/// Resolves the GitHub credential from environment variables, the GitHub
/// CLI, or the system keyring.
pub struct CliTokenProvider;

impl TokenProvider for CliTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if let Some((token, source)) = resolve_token() {
            debug!(source = %source, "Resolved GitHub token from CLI sources");
            Some(token)
        } else {
            debug!("No GitHub token found in CLI sources");
            None
        }
    }
}
