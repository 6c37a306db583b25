// SPDX-License-Identifier: Apache-2.0

//! Issue, label and repository types shared by the fetch layer and the
//! aggregation engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timeline::{Timeline, build_timeline};

/// Name of the synthetic label standing for "every issue".
pub const TOTAL_LABEL: &str = "__total";

/// Display color of the synthetic total label.
pub const TOTAL_LABEL_COLOR: &str = "0366d6";

/// Color given to labels referenced by issues but absent from the label list.
pub const MISSING_LABEL_COLOR: &str = "cccccc";

/// Host used when a repository reference carries no domain.
pub const DEFAULT_DOMAIN: &str = "github.com";

/// A repository issue as fetched. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    #[builder(into, default)]
    pub title: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Closing instant, absent while the issue is open.
    pub closed_at: Option<DateTime<Utc>>,
    /// Names of the labels attached to the issue.
    #[builder(default)]
    pub labels: BTreeSet<String>,
}

impl Issue {
    /// Returns true if the issue is still open now.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Returns true if the issue carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// A repository label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name, unique within a repository.
    pub name: String,
    /// Hex color without the leading `#`.
    pub color: String,
    /// Number of currently open issues carrying the label.
    pub open_issue_count: u64,
}

impl Label {
    /// Builds the synthetic label representing all open issues.
    #[must_use]
    pub fn total(open_issue_count: u64) -> Self {
        Self {
            name: TOTAL_LABEL.to_string(),
            color: TOTAL_LABEL_COLOR.to_string(),
            open_issue_count,
        }
    }

    /// Returns true for the synthetic total label.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.name == TOTAL_LABEL
    }
}

/// A repository on a GitHub host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Web host, e.g. `github.com`.
    pub domain: String,
    /// Owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Creates a reference on `github.com`.
    pub fn github(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Base URI of the API serving this repository.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("https://api.{}", self.domain)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain == DEFAULT_DOMAIN {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.domain, self.owner, self.name)
        }
    }
}

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// The issue set, label mapping and timeline produced by one fetch.
///
/// The three parts are created together and replaced as a unit; nothing in a
/// snapshot changes after construction. `id` is unique per process and keys
/// every memoized series computed from the snapshot.
#[derive(Debug)]
pub struct Snapshot {
    id: u64,
    repo: RepoRef,
    issues: Vec<Issue>,
    labels: BTreeMap<String, Label>,
    timeline: Timeline,
}

impl Snapshot {
    /// Assembles a snapshot from fetched data.
    ///
    /// Injects the synthetic total label and builds the timeline with `now`
    /// as its last sample point.
    pub fn new(repo: RepoRef, labels: Vec<Label>, issues: Vec<Issue>, now: DateTime<Utc>) -> Self {
        let mut label_map: BTreeMap<String, Label> = labels
            .into_iter()
            .filter(|label| !label.is_total())
            .map(|label| (label.name.clone(), label))
            .collect();

        for issue in &issues {
            for name in &issue.labels {
                if !label_map.contains_key(name) {
                    warn!(label = %name, issue = issue.number, "Issue references a label missing from the label list");
                    let open_issue_count = issues
                        .iter()
                        .filter(|i| i.is_open() && i.has_label(name))
                        .count() as u64;
                    label_map.insert(
                        name.clone(),
                        Label {
                            name: name.clone(),
                            color: MISSING_LABEL_COLOR.to_string(),
                            open_issue_count,
                        },
                    );
                }
            }
        }

        let open_issues = issues.iter().filter(|issue| issue.is_open()).count() as u64;
        label_map.insert(TOTAL_LABEL.to_string(), Label::total(open_issues));

        let timeline = build_timeline(&issues, now);

        Self {
            id: NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed),
            repo,
            issues,
            labels: label_map,
            timeline,
        }
    }

    /// Process-unique identifier of this snapshot.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Repository the snapshot was fetched from.
    #[must_use]
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// All fetched issues.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Sampling instants.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Looks up a label, including the synthetic total.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    /// Labels sorted by name, the synthetic total included.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Number of issues open right now.
    #[must_use]
    pub fn open_issue_count(&self) -> u64 {
        self.labels
            .get(TOTAL_LABEL)
            .map_or(0, |label| label.open_issue_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn label(name: &str, count: u64) -> Label {
        Label {
            name: name.to_string(),
            color: "d73a4a".to_string(),
            open_issue_count: count,
        }
    }

    #[test]
    fn test_snapshot_injects_total_label() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(at(2020, 1, 1))
                .closed_at(at(2020, 1, 10))
                .build(),
            Issue::builder().number(2).created_at(at(2020, 1, 5)).build(),
            Issue::builder().number(3).created_at(at(2020, 1, 6)).build(),
        ];

        let snapshot = Snapshot::new(RepoRef::github("o", "r"), vec![], issues, at(2021, 1, 1));

        let total = snapshot.label(TOTAL_LABEL).unwrap();
        assert_eq!(total.open_issue_count, 2);
        assert_eq!(total.color, TOTAL_LABEL_COLOR);
        assert_eq!(snapshot.open_issue_count(), 2);
    }

    #[test]
    fn test_snapshot_ignores_fetched_total_label() {
        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![label(TOTAL_LABEL, 99)],
            vec![],
            at(2021, 1, 1),
        );
        assert_eq!(snapshot.open_issue_count(), 0);
    }

    #[test]
    fn test_snapshot_adds_missing_labels() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(at(2020, 1, 1))
                .labels(["bug", "ghost"].map(String::from).into())
                .build(),
        ];

        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![label("bug", 1)],
            issues,
            at(2021, 1, 1),
        );

        let ghost = snapshot.label("ghost").unwrap();
        assert_eq!(ghost.open_issue_count, 1);
        assert_eq!(ghost.color, MISSING_LABEL_COLOR);
    }

    #[test]
    fn test_labels_sorted_by_name() {
        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![label("enhancement", 0), label("bug", 0)],
            vec![],
            at(2021, 1, 1),
        );

        let names: Vec<&str> = snapshot.labels().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["__total", "bug", "enhancement"]);
    }

    #[test]
    fn test_snapshot_ids_are_unique() {
        let a = Snapshot::new(RepoRef::github("o", "r"), vec![], vec![], at(2021, 1, 1));
        let b = Snapshot::new(RepoRef::github("o", "r"), vec![], vec![], at(2021, 1, 1));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_repo_ref_display_and_api_base() {
        let repo = RepoRef::github("octocat", "Hello-World");
        assert_eq!(repo.to_string(), "octocat/Hello-World");
        assert_eq!(repo.api_base(), "https://api.github.com");

        let enterprise = RepoRef {
            domain: "ghe.example.com".to_string(),
            owner: "team".to_string(),
            name: "tool".to_string(),
        };
        assert_eq!(enterprise.to_string(), "ghe.example.com/team/tool");
        assert_eq!(enterprise.api_base(), "https://api.ghe.example.com");
    }
}
