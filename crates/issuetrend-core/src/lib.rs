// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Issuetrend Core
//!
//! Core library for issuetrend: open-issue counts of a GitHub repository over
//! time, per label or for label intersections.
//!
//! This crate provides:
//! - GitHub data fetching (GraphQL labels, concurrent REST issue pages)
//! - The timeline and series aggregation engine
//! - A session state container with a pure reducer
//! - Configuration, fetch cache and persisted state
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use issuetrend_core::{
//!     Issue, RepoRef, SelectionAction, SelectionMode, Session, Snapshot,
//! };
//! use std::sync::Arc;
//!
//! let day = |d| Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap();
//! let issues = vec![
//!     Issue::builder()
//!         .number(1)
//!         .created_at(day(1))
//!         .labels(["bug".to_string()].into())
//!         .build(),
//!     Issue::builder()
//!         .number(2)
//!         .created_at(day(2))
//!         .closed_at(day(3))
//!         .build(),
//! ];
//! let snapshot = Snapshot::new(RepoRef::github("o", "r"), vec![], issues, day(5));
//!
//! let mut session = Session::new();
//! session.load(Arc::new(snapshot));
//! session.select(SelectionAction::Toggle("bug".to_string()));
//!
//! let chart = session.chart().unwrap();
//! assert_eq!(chart.series[0].data, vec![1, 2, 1, 1]);
//! assert_eq!(chart.series[1].data, vec![1, 1, 1, 1]);
//!
//! session.select(SelectionAction::SetMode(SelectionMode::And));
//! let chart = session.chart().unwrap();
//! assert_eq!(chart.series.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`aggregate`] - Series computation and memoization
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`github`] - GitHub API (auth, labels, issues)
//! - [`session`] - State container
//! - [`store`] - Persisted key-value state

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{StaticTokenProvider, TokenProvider};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{FetchError, IssueTrendError};

/// Convenience Result type for issuetrend operations.
///
/// This is equivalent to `std::result::Result<T, IssueTrendError>`.
pub type Result<T> = std::result::Result<T, IssueTrendError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, CacheConfig, GitHubConfig, UiConfig, UserConfig, config_dir, config_file_path,
    data_dir, load_config,
};

// ============================================================================
// Caching and Persistence
// ============================================================================

pub use cache::{CacheEntry, FetchedRepository};
pub use store::{FileStore, KeyValueStore, MemoryStore, STORE_KEY_MODE, STORE_KEY_REPOSITORY};

// ============================================================================
// Data Model and Aggregation
// ============================================================================

pub use aggregate::{Chart, LabelFilter, Series, SeriesCache, build_chart, compute_series};
pub use model::{Issue, Label, RepoRef, Snapshot, TOTAL_LABEL, TOTAL_LABEL_COLOR};
pub use selection::{Selection, SelectionAction, SelectionMode};
pub use session::{ChartState, Session, SessionAction, SessionState, reduce};
pub use timeline::{Timeline, build_timeline};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::auth::TokenSource;
pub use github::{
    Credentials, GitHubRepository, IssueRepository, ProgressFn, fetch_snapshot, parse_repo_input,
};

// ============================================================================
// Utilities
// ============================================================================

pub use utils::{format_instant, truncate, truncate_with_suffix};

// ============================================================================
// Platform-Agnostic Facade
// ============================================================================

pub use facade::{load_repository, open_repository, persisted_mode, remember, resolve_repository};

// ============================================================================
// Modules
// ============================================================================

pub mod aggregate;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod github;
pub mod model;
pub mod selection;
pub mod session;
pub mod store;
pub mod timeline;
pub mod utils;
