// SPDX-License-Identifier: Apache-2.0

//! TTL-based file caching of fetched repository data.
//!
//! Each repository's labels and issues are stored as one JSON file with the
//! time they were fetched. Entries older than the configured TTL are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IssueTrendError;
use crate::model::{Issue, Label, RepoRef};

/// A cached entry with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the entry was cached.
    pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// Check if this entry is still valid based on TTL.
    pub fn is_valid(&self, ttl: Duration) -> bool {
        Utc::now().signed_duration_since(self.cached_at) < ttl
    }
}

/// Raw fetch result for one repository, before snapshot assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedRepository {
    /// Labels as returned by the host.
    pub labels: Vec<Label>,
    /// Issues, pull requests excluded.
    pub issues: Vec<Issue>,
}

/// Returns the cache directory.
///
/// - Linux: `~/.cache/issuetrend`
/// - macOS: `~/Library/Caches/issuetrend`
/// - Windows: `C:\Users\<User>\AppData\Local\issuetrend`
#[must_use]
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .expect("Failed to determine cache directory")
        .join("issuetrend")
}

/// Cache key in the format `snapshots/{domain}_{owner}_{name}.json`.
#[must_use]
pub fn cache_key_snapshot(repo: &RepoRef) -> String {
    format!("snapshots/{}_{}_{}.json", repo.domain, repo.owner, repo.name)
}

fn cache_error(action: &str, path: &Path, err: impl std::fmt::Display) -> IssueTrendError {
    IssueTrendError::Store {
        message: format!("Failed to {action} cache file {}: {err}", path.display()),
    }
}

/// Read a cache entry below `root`. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns `IssueTrendError::Store` if the file exists but cannot be read or parsed.
pub fn read_cache_in<T: for<'de> Deserialize<'de>>(
    root: &Path,
    key: &str,
) -> crate::Result<Option<CacheEntry<T>>> {
    let path = root.join(key);

    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).map_err(|e| cache_error("read", &path, e))?;
    let entry: CacheEntry<T> =
        serde_json::from_str(&contents).map_err(|e| cache_error("parse", &path, e))?;

    Ok(Some(entry))
}

/// Write a cache entry below `root`, creating parent directories.
///
/// Writes to a temp file and renames it into place.
///
/// # Errors
///
/// Returns `IssueTrendError::Store` if the file cannot be written.
pub fn write_cache_in<T: Serialize>(
    root: &Path,
    key: &str,
    entry: &CacheEntry<T>,
) -> crate::Result<()> {
    let path = root.join(key);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| cache_error("create directory for", &path, e))?;
    }

    let contents = serde_json::to_string(entry).map_err(|e| cache_error("serialize", &path, e))?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(|e| cache_error("write", &temp_path, e))?;
    fs::rename(&temp_path, &path).map_err(|e| cache_error("rename", &path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fetched() -> FetchedRepository {
        FetchedRepository {
            labels: vec![Label {
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                open_issue_count: 1,
            }],
            issues: vec![
                Issue::builder()
                    .number(1)
                    .title("Crash")
                    .created_at(Utc::now() - Duration::days(3))
                    .labels(["bug".to_string()].into())
                    .build(),
            ],
        }
    }

    #[test]
    fn test_cache_entry_is_valid_within_ttl() {
        let entry = CacheEntry::new(fetched());
        assert!(entry.is_valid(Duration::minutes(30)));
    }

    #[test]
    fn test_cache_entry_is_valid_expired() {
        let mut entry = CacheEntry::new(fetched());
        entry.cached_at = Utc::now() - Duration::hours(2);
        assert!(!entry.is_valid(Duration::hours(1)));
    }

    #[test]
    fn test_cache_key_snapshot() {
        let key = cache_key_snapshot(&RepoRef::github("owner", "repo"));
        assert_eq!(key, "snapshots/github.com_owner_repo.json");
    }

    #[test]
    fn test_cache_dir_path() {
        assert!(cache_dir().ends_with("issuetrend"));
    }

    #[test]
    fn test_read_cache_nonexistent() {
        let dir = TempDir::new().unwrap();
        let result: crate::Result<Option<CacheEntry<FetchedRepository>>> =
            read_cache_in(dir.path(), "snapshots/missing.json");
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_write_and_read_cache() {
        let dir = TempDir::new().unwrap();
        let key = cache_key_snapshot(&RepoRef::github("o", "r"));
        let entry = CacheEntry::new(fetched());

        write_cache_in(dir.path(), &key, &entry).unwrap();
        let read: CacheEntry<FetchedRepository> =
            read_cache_in(dir.path(), &key).unwrap().unwrap();

        assert_eq!(read.data.labels, entry.data.labels);
        assert_eq!(read.data.issues, entry.data.issues);
        assert!(!dir.path().join(&key).with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("snapshots")).unwrap();
        fs::write(dir.path().join("snapshots/bad.json"), "{not json").unwrap();

        let result: crate::Result<Option<CacheEntry<FetchedRepository>>> =
            read_cache_in(dir.path(), "snapshots/bad.json");
        assert!(matches!(result, Err(IssueTrendError::Store { .. })));
    }
}
