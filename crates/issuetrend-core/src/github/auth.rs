// SPDX-License-Identifier: Apache-2.0

//! GitHub credential resolution.
//!
//! Token resolution priority chain:
//! 1. `ISSUETREND_TOKEN` (a token, or `login:token` for basic auth)
//! 2. `GH_TOKEN` or `GITHUB_TOKEN`
//! 3. GitHub CLI (`gh auth token`)
//! 4. System keyring (`issuetrend auth login`)
//!
//! Tokens are only ever kept in memory or in the keyring, never in the
//! state store.

use std::process::Command;

#[cfg(feature = "keyring")]
use keyring::Entry;
use secrecy::SecretString;
#[cfg(feature = "keyring")]
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, instrument};
#[cfg(feature = "keyring")]
use tracing::info;

#[cfg(feature = "keyring")]
use super::{KEYRING_SERVICE, KEYRING_USER};

/// Environment variable checked before the GitHub ones.
pub const TOKEN_ENV_VAR: &str = "ISSUETREND_TOKEN";

/// Source of the GitHub authentication token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Token from `ISSUETREND_TOKEN`, `GH_TOKEN` or `GITHUB_TOKEN`.
    Environment,
    /// Token from `gh auth token` command.
    GhCli,
    /// Token from system keyring.
    Keyring,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "environment variable"),
            TokenSource::GhCli => write!(f, "GitHub CLI"),
            TokenSource::Keyring => write!(f, "system keyring"),
        }
    }
}

#[cfg(feature = "keyring")]
fn keyring_entry() -> crate::Result<Entry> {
    Ok(Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
}

/// Checks if a token is stored in the keyring specifically.
#[cfg(feature = "keyring")]
#[instrument]
#[allow(clippy::let_and_return)] // Intentional: Rust 2024 drop order compliance
pub fn has_keyring_token() -> bool {
    let result = match keyring_entry() {
        Ok(entry) => entry.get_password().is_ok(),
        Err(_) => false,
    };
    result
}

/// Retrieves the stored token from the keyring.
#[cfg(feature = "keyring")]
#[instrument]
pub fn get_stored_token() -> Option<SecretString> {
    let entry = keyring_entry().ok()?;
    let password = entry.get_password().ok()?;
    debug!("Retrieved token from keyring");
    Some(SecretString::from(password))
}

/// Stores a token in the system keyring.
#[cfg(feature = "keyring")]
#[instrument(skip(token))]
pub fn store_token(token: &SecretString) -> crate::Result<()> {
    keyring_entry()?.set_password(token.expose_secret())?;
    info!("Token stored in system keyring");
    Ok(())
}

/// Deletes the stored token from the keyring.
#[cfg(feature = "keyring")]
#[instrument]
pub fn delete_token() -> crate::Result<()> {
    keyring_entry()?.delete_credential()?;
    info!("Token deleted from keyring");
    Ok(())
}

fn non_empty_env(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| SecretString::from(value.trim().to_string()))
}

/// Attempts to get a token from the GitHub CLI (`gh auth token`).
///
/// Returns `None` if `gh` is missing, not logged in, or fails otherwise.
#[instrument]
fn get_token_from_gh_cli() -> Option<SecretString> {
    let output = match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "Failed to execute gh command");
            return None;
        }
    };

    if !output.status.success() {
        debug!(
            status = ?output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "gh auth token failed"
        );
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        debug!("gh auth token returned empty output");
        return None;
    }
    Some(SecretString::from(token))
}

/// Resolves a token using the priority chain.
#[instrument]
pub fn resolve_token() -> Option<(SecretString, TokenSource)> {
    for name in [TOKEN_ENV_VAR, "GH_TOKEN", "GITHUB_TOKEN"] {
        if let Some(token) = non_empty_env(name) {
            debug!(variable = name, "Using token from environment");
            return Some((token, TokenSource::Environment));
        }
    }

    if let Some(token) = get_token_from_gh_cli() {
        debug!("Using token from GitHub CLI");
        return Some((token, TokenSource::GhCli));
    }

    #[cfg(feature = "keyring")]
    if let Some(token) = get_stored_token() {
        debug!("Using token from system keyring");
        return Some((token, TokenSource::Keyring));
    }

    debug!("No token found in any source");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    fn test_token_source_display() {
        assert_eq!(TokenSource::Environment.to_string(), "environment variable");
        assert_eq!(TokenSource::GhCli.to_string(), "GitHub CLI");
        assert_eq!(TokenSource::Keyring.to_string(), "system keyring");
    }

    #[test]
    #[serial]
    fn test_own_variable_wins() {
        // SAFETY: serialized with other environment tests.
        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, " octocat:ghp_abc ");
            std::env::set_var("GH_TOKEN", "ghp_other");
        }

        let (token, source) = resolve_token().unwrap();

        unsafe {
            std::env::remove_var(TOKEN_ENV_VAR);
            std::env::remove_var("GH_TOKEN");
        }
        assert_eq!(source, TokenSource::Environment);
        assert_eq!(token.expose_secret(), "octocat:ghp_abc");
    }

    #[test]
    #[serial]
    fn test_blank_variable_is_skipped() {
        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, "   ");
            std::env::set_var("GITHUB_TOKEN", "ghp_fallback");
        }

        let resolved = resolve_token();

        unsafe {
            std::env::remove_var(TOKEN_ENV_VAR);
            std::env::remove_var("GITHUB_TOKEN");
        }
        let (token, _) = resolved.unwrap();
        assert_eq!(token.expose_secret(), "ghp_fallback");
    }
}
