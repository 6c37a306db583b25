// SPDX-License-Identifier: Apache-2.0

//! GitHub authentication commands.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use issuetrend_core::Credentials;
use issuetrend_core::github::auth;
use secrecy::SecretString;
use tracing::info;

use super::types::AuthStatusResult;

/// Run the login command - prompt for a token and store it in the keyring.
pub fn run_login() -> Result<()> {
    if let Some((_, source)) = auth::resolve_token() {
        println!(
            "{} Already authenticated with GitHub (via {}).",
            style("!").yellow().bold(),
            source
        );
        println!(
            "Run {} to remove the keyring token and log in again.",
            style("issuetrend auth logout").cyan()
        );
        return Ok(());
    }

    println!(
        "{} Create a token at {} (read access to public repositories is enough).",
        style("*").cyan().bold(),
        style("https://github.com/settings/tokens").underlined()
    );
    let secret = Password::new()
        .with_prompt("GitHub token (or LOGIN:TOKEN)")
        .interact()
        .context("Failed to read token")?;

    auth::store_token(&SecretString::from(secret.trim().to_string()))?;

    println!(
        "{} Token stored in the system keyring.",
        style("*").green().bold()
    );
    Ok(())
}

/// Run the logout command - remove stored credentials.
pub fn run_logout() -> Result<()> {
    if !auth::has_keyring_token() {
        println!("{} No token stored in keyring.", style("!").yellow().bold());
        return Ok(());
    }

    auth::delete_token()?;

    info!("Logged out from GitHub");
    println!(
        "{} Logged out from GitHub. Token removed from keyring.",
        style("*").green().bold()
    );
    Ok(())
}

/// Run the status command - show where the credential comes from.
pub fn run_status() -> AuthStatusResult {
    match auth::resolve_token() {
        Some((secret, source)) => AuthStatusResult {
            authenticated: true,
            method: Some(source),
            credential_kind: Some(match Credentials::from_secret(&secret) {
                Credentials::Token(_) => "token",
                Credentials::Basic { .. } => "basic",
            }),
        },
        None => AuthStatusResult {
            authenticated: false,
            method: None,
            credential_kind: None,
        },
    }
}
