// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Provides the [`IssueRepository`] seam the rest of the crate fetches
//! through, its octocrab-backed implementation, repository reference parsing
//! and credential handling.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use crate::error::FetchError;
use crate::model::{Issue, Label, RepoRef, Snapshot};

pub mod auth;
pub mod graphql;
pub mod issues;

/// Keyring service name for storing credentials.
#[cfg(feature = "keyring")]
pub const KEYRING_SERVICE: &str = "issuetrend";

/// Keyring username for the GitHub token.
#[cfg(feature = "keyring")]
pub const KEYRING_USER: &str = "github_token";

/// Progress callback receiving a percentage in `0..=100`.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Source of a repository's labels and issues.
///
/// Implementations paginate internally and hand back complete lists.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Every label of the repository, in the order the host returns them.
    async fn fetch_all_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, FetchError>;

    /// Every issue of the repository, pull requests excluded.
    ///
    /// `on_progress` is called after each page with the share of pages
    /// received so far.
    async fn fetch_all_issues(
        &self,
        repo: &RepoRef,
        on_progress: ProgressFn<'_>,
    ) -> Result<Vec<Issue>, FetchError>;
}

/// Fetches labels and issues concurrently and assembles a snapshot.
///
/// Either fetch failing fails the whole operation.
#[instrument(skip(repository, on_progress), fields(repo = %target))]
pub async fn fetch_snapshot(
    repository: &dyn IssueRepository,
    target: &RepoRef,
    now: DateTime<Utc>,
    on_progress: ProgressFn<'_>,
) -> Result<Snapshot, FetchError> {
    let (labels, issues) = futures::try_join!(
        repository.fetch_all_labels(target),
        repository.fetch_all_issues(target, on_progress),
    )?;

    debug!(
        labels = labels.len(),
        issues = issues.len(),
        "Fetched repository data"
    );
    Ok(Snapshot::new(target.clone(), labels, issues, now))
}

/// Credentials sent with every request.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Personal access token.
    Token(SecretString),
    /// Basic authentication, usually `login:token`.
    Basic {
        /// Account login.
        username: String,
        /// Password or token.
        password: SecretString,
    },
}

impl Credentials {
    /// Interprets a secret: `user:token` becomes basic auth, anything else a token.
    #[must_use]
    pub fn from_secret(secret: &SecretString) -> Self {
        match secret.expose_secret().split_once(':') {
            Some((username, password)) if !username.is_empty() && !password.is_empty() => {
                Credentials::Basic {
                    username: username.to_string(),
                    password: SecretString::from(password.to_string()),
                }
            }
            _ => Credentials::Token(secret.clone()),
        }
    }
}

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?P<domain>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+)/(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+?)(?:\.git)?(?:/.*)?$",
    )
    .expect("valid repository URL pattern")
});

static SSH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^git@(?P<domain>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+):(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+?)(?:\.git)?$",
    )
    .expect("valid repository SSH pattern")
});

static SHORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+)$")
        .expect("valid owner/repo pattern")
});

/// Parses a repository reference.
///
/// Supports:
/// - Short form: `owner/repo` (github.com)
/// - Web URL: `https://github.com/owner/repo`, optionally with `.git` or a trailing path
/// - Other hosts: `https://ghe.example.com/owner/repo`
/// - SSH remote: `git@github.com:owner/repo.git`
///
/// # Errors
///
/// Returns [`FetchError::InvalidInput`] if no form matches.
pub fn parse_repo_input(input: &str) -> Result<RepoRef, FetchError> {
    let input = input.trim();

    if let Some(caps) = SHORT_PATTERN.captures(input) {
        return Ok(RepoRef::github(&caps["owner"], &caps["name"]));
    }

    if let Some(caps) = SSH_PATTERN
        .captures(input)
        .or_else(|| URL_PATTERN.captures(input))
    {
        let repo = RepoRef {
            domain: caps["domain"].to_ascii_lowercase(),
            owner: caps["owner"].to_string(),
            name: caps["name"].to_string(),
        };
        debug!(repo = %repo, "Parsed repository URL");
        return Ok(repo);
    }

    Err(FetchError::InvalidInput {
        input: input.to_string(),
    })
}

/// [`IssueRepository`] backed by the GitHub GraphQL and REST APIs.
#[derive(Debug, Clone)]
pub struct GitHubRepository {
    client: Octocrab,
    page_size: u32,
    max_concurrent_pages: usize,
}

impl GitHubRepository {
    /// Creates a client for the API host serving `repo`.
    #[instrument(skip(credentials, settings), fields(repo = %repo))]
    pub fn connect(
        repo: &RepoRef,
        credentials: &Credentials,
        settings: &GitHubConfig,
    ) -> Result<Self, FetchError> {
        let api_base = repo.api_base();
        let timeout = Duration::from_secs(settings.api_timeout_seconds);

        let builder = Octocrab::builder()
            .base_uri(api_base.as_str())
            .map_err(FetchError::unknown)?
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout));

        let client = match credentials {
            Credentials::Token(token) => builder
                .personal_token(token.expose_secret().to_string())
                .build(),
            Credentials::Basic { username, password } => builder
                .basic_auth(username.clone(), password.expose_secret().to_string())
                .build(),
        }
        .map_err(FetchError::unknown)?;

        debug!(api_base = %api_base, "Created GitHub client");
        Ok(Self {
            client,
            page_size: settings.page_size.clamp(1, 100),
            max_concurrent_pages: settings.max_concurrent_pages.max(1),
        })
    }
}

#[async_trait]
impl IssueRepository for GitHubRepository {
    async fn fetch_all_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, FetchError> {
        graphql::fetch_all_labels(&self.client, repo).await
    }

    async fn fetch_all_issues(
        &self,
        repo: &RepoRef,
        on_progress: ProgressFn<'_>,
    ) -> Result<Vec<Issue>, FetchError> {
        let total = graphql::fetch_issue_and_pr_total(&self.client, repo).await?;
        issues::fetch_issue_pages(
            &self.client,
            repo,
            total,
            self.page_size,
            self.max_concurrent_pages,
            on_progress,
        )
        .await
    }
}
