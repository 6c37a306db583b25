// SPDX-License-Identifier: Apache-2.0

//! Platform-agnostic facade functions for front ends.
//!
//! Wraps credential resolution, client creation, the fetch cache and state
//! persistence around [`Session`]. Each front end implements
//! [`TokenProvider`] and calls these functions with its own credential source.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, instrument, warn};

use crate::auth::TokenProvider;
use crate::cache::{self, CacheEntry, FetchedRepository};
use crate::config::AppConfig;
use crate::error::IssueTrendError;
use crate::github::{Credentials, GitHubRepository, ProgressFn, parse_repo_input};
use crate::model::{RepoRef, Snapshot};
use crate::selection::SelectionMode;
use crate::session::Session;
use crate::store::{KeyValueStore, STORE_KEY_MODE, STORE_KEY_REPOSITORY};

/// Picks the repository to chart.
///
/// Order: explicit argument, then the persisted repository, then
/// `user.default_repo`.
///
/// # Errors
///
/// Returns `IssueTrendError::Config` if no source names a repository, or the
/// parse error of the chosen input.
pub fn resolve_repository(
    argument: Option<&str>,
    store: &dyn KeyValueStore,
    config: &AppConfig,
) -> crate::Result<RepoRef> {
    let input = argument
        .map(str::to_string)
        .or_else(|| store.get(STORE_KEY_REPOSITORY))
        .or_else(|| config.user.default_repo.clone())
        .ok_or_else(|| IssueTrendError::Config {
            message: "No repository given. Pass OWNER/REPO or set user.default_repo".to_string(),
        })?;

    Ok(parse_repo_input(&input)?)
}

/// Selection mode persisted by the last run, defaulting to OR.
#[must_use]
pub fn persisted_mode(store: &dyn KeyValueStore) -> SelectionMode {
    store
        .get(STORE_KEY_MODE)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// Records the charted repository and mode for the next run.
pub fn remember(store: &mut dyn KeyValueStore, repo: &RepoRef, mode: SelectionMode) {
    store.set(STORE_KEY_REPOSITORY, repo.to_string());
    store.set(STORE_KEY_MODE, mode.to_string());
}

/// Creates a GitHub client for `target` with the provider's credential.
///
/// # Errors
///
/// Returns `IssueTrendError::NotAuthenticated` without a credential, or a
/// fetch error if the client cannot be built.
#[instrument(skip(provider, config), fields(repo = %target))]
pub fn open_repository(
    provider: &dyn TokenProvider,
    target: &RepoRef,
    config: &AppConfig,
) -> crate::Result<GitHubRepository> {
    let secret = provider
        .github_token()
        .ok_or(IssueTrendError::NotAuthenticated)?;
    let credentials = Credentials::from_secret(&secret);
    Ok(GitHubRepository::connect(target, &credentials, &config.github)?)
}

fn cached_snapshot(root: &Path, target: &RepoRef, ttl: Duration) -> Option<Snapshot> {
    let key = cache::cache_key_snapshot(target);
    match cache::read_cache_in::<FetchedRepository>(root, &key) {
        Ok(Some(entry)) if entry.is_valid(ttl) => {
            debug!(cached_at = %entry.cached_at, "Using cached repository data");
            Some(Snapshot::new(
                target.clone(),
                entry.data.labels,
                entry.data.issues,
                Utc::now(),
            ))
        }
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable cache entry");
            None
        }
    }
}

fn store_snapshot(root: &Path, snapshot: &Snapshot) {
    let fetched = FetchedRepository {
        labels: snapshot
            .labels()
            .filter(|label| !label.is_total())
            .cloned()
            .collect(),
        issues: snapshot.issues().to_vec(),
    };
    let key = cache::cache_key_snapshot(snapshot.repo());
    if let Err(e) = cache::write_cache_in(root, &key, &CacheEntry::new(fetched)) {
        warn!(error = %e, "Failed to write cache entry");
    }
}

/// Loads `target` into `session`, from the fetch cache when allowed and
/// fresh, otherwise from GitHub.
///
/// A cache hit reports 100 once. A fresh fetch is written back to the cache.
///
/// # Errors
///
/// Returns `IssueTrendError::NotAuthenticated` without a credential, or the
/// fetch error. The session is reset in that case.
#[instrument(skip(session, provider, config, on_progress), fields(repo = %target, use_cache))]
pub async fn load_repository(
    session: &mut Session,
    provider: &dyn TokenProvider,
    target: &RepoRef,
    config: &AppConfig,
    use_cache: bool,
    on_progress: ProgressFn<'_>,
) -> crate::Result<Arc<Snapshot>> {
    let root = cache::cache_dir();
    let ttl = Duration::minutes(config.cache.snapshot_ttl_minutes);

    if use_cache && let Some(snapshot) = cached_snapshot(&root, target, ttl) {
        let snapshot = Arc::new(snapshot);
        session.load(Arc::clone(&snapshot));
        on_progress(100);
        return Ok(snapshot);
    }

    let repository = open_repository(provider, target, config)?;
    let snapshot = session.refresh(&repository, target, on_progress).await?;
    store_snapshot(&root, &snapshot);
    Ok(snapshot)
}
