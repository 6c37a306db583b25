// SPDX-License-Identifier: Apache-2.0

//! Labels command.

use anyhow::Result;
use issuetrend_core::{AppConfig, FileStore, Label, Session, Snapshot, resolve_repository};

use super::fetch_with_progress;
use super::types::LabelsResult;
use crate::cli::{OutputContext, RepoArgs};

/// Labels sorted by open issue count (descending), then name.
fn ranked_labels(snapshot: &Snapshot) -> Vec<Label> {
    let mut labels: Vec<Label> = snapshot
        .labels()
        .filter(|label| !label.is_total())
        .cloned()
        .collect();
    labels.sort_by(|a, b| {
        b.open_issue_count
            .cmp(&a.open_issue_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    labels
}

/// Fetches the repository and lists its labels.
pub async fn run(args: RepoArgs, ctx: &OutputContext, config: &AppConfig) -> Result<LabelsResult> {
    let store = FileStore::load_default()?;
    let target = resolve_repository(args.repo.as_deref(), &store, config)?;

    let mut session = Session::new();
    let snapshot = fetch_with_progress(&mut session, &target, !args.no_cache, ctx, config).await?;

    Ok(LabelsResult {
        repo: target,
        open_issues: snapshot.open_issue_count(),
        labels: ranked_labels(&snapshot),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use issuetrend_core::RepoRef;

    fn label(name: &str, open_issue_count: u64) -> Label {
        Label {
            name: name.to_string(),
            color: "ededed".to_string(),
            open_issue_count,
        }
    }

    #[test]
    fn test_ranked_labels() {
        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![label("docs", 1), label("bug", 4), label("area", 1)],
            vec![],
            Utc::now(),
        );

        let names: Vec<String> = ranked_labels(&snapshot)
            .into_iter()
            .map(|l| l.name)
            .collect();

        assert_eq!(names, ["bug", "area", "docs"]);
    }
}
