// SPDX-License-Identifier: Apache-2.0

//! Token provider abstraction.
//!
//! Front ends implement [`TokenProvider`] to supply credentials from their
//! own sources; the library never prompts.

use secrecy::SecretString;

/// Provides the GitHub credential for API calls.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub token, or `login:token` for basic auth.
    ///
    /// Returns `None` if no credential is available from any source.
    fn github_token(&self) -> Option<SecretString>;
}

/// Provider over a fixed, possibly absent, credential.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider(pub Option<SecretString>);

impl TokenProvider for StaticTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_static_provider_with_token() {
        let provider = StaticTokenProvider(Some(SecretString::from("gh_token".to_string())));
        assert_eq!(provider.github_token().unwrap().expose_secret(), "gh_token");
    }

    #[test]
    fn test_static_provider_without_token() {
        assert!(StaticTokenProvider::default().github_token().is_none());
    }
}
