// SPDX-License-Identifier: Apache-2.0

//! Open-issue counts over the timeline.
//!
//! An issue is open at `t` when `created_at <= t < closed_at` (or it has no
//! `closed_at`). OR mode yields one memoized series per selected label; AND
//! mode yields a single series of issues carrying every selected label and
//! is always recomputed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::model::{Issue, RepoRef, Snapshot, TOTAL_LABEL, TOTAL_LABEL_COLOR};
use crate::selection::{Selection, SelectionMode};
use crate::timeline::Timeline;

/// Which issues a count includes, label-wise.
#[derive(Debug, Clone, Copy)]
pub enum LabelFilter<'a> {
    /// Every issue.
    Total,
    /// Issues carrying this label. The total label name maps to `Total`.
    Single(&'a str),
    /// Issues carrying every one of these labels. An empty set matches nothing.
    All(&'a [String]),
}

impl<'a> LabelFilter<'a> {
    /// Filter for a single OR-mode label.
    #[must_use]
    pub fn for_label(label: &'a str) -> Self {
        if label == TOTAL_LABEL {
            LabelFilter::Total
        } else {
            LabelFilter::Single(label)
        }
    }

    fn matches(self, issue: &Issue) -> bool {
        match self {
            LabelFilter::Total => true,
            LabelFilter::Single(label) => issue.has_label(label),
            LabelFilter::All(labels) => {
                !labels.is_empty() && labels.iter().all(|label| issue.has_label(label))
            }
        }
    }
}

/// Returns true if `issue` existed, was not yet closed at `at`, and passes `filter`.
#[must_use]
pub fn is_open_and_matching(issue: &Issue, at: DateTime<Utc>, filter: LabelFilter<'_>) -> bool {
    if at < issue.created_at {
        return false;
    }
    if issue.closed_at.is_some_and(|closed_at| at >= closed_at) {
        return false;
    }
    filter.matches(issue)
}

/// Number of issues open and matching at `at`.
#[must_use]
pub fn count_open_at(issues: &[Issue], at: DateTime<Utc>, filter: LabelFilter<'_>) -> u64 {
    issues
        .iter()
        .filter(|issue| is_open_and_matching(issue, at, filter))
        .count() as u64
}

/// Counts for every timeline entry.
///
/// Each matching issue contributes +1 over the index range
/// `[first sample >= created_at, first sample >= closed_at)`; a prefix sum
/// over those deltas gives the same numbers as calling [`count_open_at`] for
/// each sample.
#[must_use]
pub fn compute_series(issues: &[Issue], timeline: &Timeline, filter: LabelFilter<'_>) -> Vec<u64> {
    let len = timeline.len();
    let mut deltas = vec![0i64; len + 1];

    for issue in issues.iter().filter(|issue| filter.matches(issue)) {
        let start = timeline.first_at_or_after(issue.created_at);
        let end = issue
            .closed_at
            .map_or(len, |closed_at| timeline.first_at_or_after(closed_at));
        if start < end {
            deltas[start] += 1;
            deltas[end] -= 1;
        }
    }

    let mut running = 0i64;
    deltas[..len]
        .iter()
        .map(|delta| {
            running += delta;
            u64::try_from(running).unwrap_or(0)
        })
        .collect()
}

/// One line of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    /// Legend text: the label name, or the joined names in AND mode.
    pub label: String,
    /// Hex color without the leading `#`.
    pub color: String,
    /// One count per timeline entry.
    pub data: Vec<u64>,
}

/// Everything presentation needs to draw the chart.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    /// Repository the data belongs to.
    pub repo: RepoRef,
    /// Mode the series were computed with.
    pub mode: SelectionMode,
    /// Issues open right now.
    pub open_issues: u64,
    /// Sample instants (x axis).
    pub timeline: Timeline,
    /// Series in selection order.
    pub series: Vec<Series>,
}

/// Memoized OR-mode series, valid for a single snapshot.
///
/// Entries are keyed by label name and tagged with the snapshot id they were
/// computed from; asking with a different snapshot drops every entry.
#[derive(Debug, Default)]
pub struct SeriesCache {
    snapshot_id: Option<u64>,
    entries: HashMap<String, Vec<u64>>,
}

impl SeriesCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `label` has a memoized series for `snapshot`.
    #[must_use]
    pub fn contains(&self, snapshot: &Snapshot, label: &str) -> bool {
        self.snapshot_id == Some(snapshot.id()) && self.entries.contains_key(label)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.snapshot_id = None;
        self.entries.clear();
    }

    fn bind(&mut self, snapshot: &Snapshot) {
        if self.snapshot_id != Some(snapshot.id()) {
            if !self.entries.is_empty() {
                debug!(
                    dropped = self.entries.len(),
                    "Snapshot changed, clearing series cache"
                );
            }
            self.entries.clear();
            self.snapshot_id = Some(snapshot.id());
        }
    }

    /// Series for one label, computed on first request.
    ///
    /// Returns an owned copy so callers cannot alter the memoized values.
    pub fn label_series(&mut self, snapshot: &Snapshot, label: &str) -> Vec<u64> {
        self.bind(snapshot);
        self.entries
            .entry(label.to_string())
            .or_insert_with(|| {
                debug!(label = %label, "Computing label series");
                compute_series(
                    snapshot.issues(),
                    snapshot.timeline(),
                    LabelFilter::for_label(label),
                )
            })
            .clone()
    }
}

/// OR mode: one series per selected label, in selection order.
pub fn or_series(snapshot: &Snapshot, labels: &[String], cache: &mut SeriesCache) -> Vec<Series> {
    labels
        .iter()
        .map(|label| Series {
            label: label.clone(),
            color: snapshot
                .label(label)
                .map_or_else(|| TOTAL_LABEL_COLOR.to_string(), |l| l.color.clone()),
            data: cache.label_series(snapshot, label),
        })
        .collect()
}

/// AND mode: a single series of issues carrying every selected label.
///
/// An empty selection yields all zeros, not every issue. The total label on
/// its own yields the total series; next to real labels it matches no issue,
/// since no issue carries it.
#[must_use]
pub fn and_series(snapshot: &Snapshot, labels: &[String]) -> Series {
    let data = match labels {
        [] => vec![0; snapshot.timeline().len()],
        [only] if only == TOTAL_LABEL => {
            compute_series(snapshot.issues(), snapshot.timeline(), LabelFilter::Total)
        }
        _ => compute_series(
            snapshot.issues(),
            snapshot.timeline(),
            LabelFilter::All(labels),
        ),
    };

    Series {
        label: labels.join(", "),
        color: TOTAL_LABEL_COLOR.to_string(),
        data,
    }
}

/// Builds the chart for a selection, using `cache` for OR-mode series.
#[instrument(skip_all, fields(repo = %snapshot.repo(), mode = %selection.mode(), labels = selection.labels().len()))]
pub fn build_chart(snapshot: &Snapshot, selection: &Selection, cache: &mut SeriesCache) -> Chart {
    let series = match selection.mode() {
        SelectionMode::Or => or_series(snapshot, selection.labels(), cache),
        SelectionMode::And => vec![and_series(snapshot, selection.labels())],
    };

    Chart {
        repo: snapshot.repo().clone(),
        mode: selection.mode(),
        open_issues: snapshot.open_issue_count(),
        timeline: snapshot.timeline().clone(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use crate::selection::SelectionAction;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn issue(
        number: u64,
        created_at: DateTime<Utc>,
        closed_at: Option<DateTime<Utc>>,
        labels: &[&str],
    ) -> Issue {
        Issue::builder()
            .number(number)
            .created_at(created_at)
            .maybe_closed_at(closed_at)
            .labels(labels.iter().map(|l| (*l).to_string()).collect())
            .build()
    }

    fn label(name: &str, color: &str) -> Label {
        Label {
            name: name.to_string(),
            color: color.to_string(),
            open_issue_count: 0,
        }
    }

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| (*l).to_string()).collect()
    }

    /// Two issues from the reference scenario, sampled at 2021-01-01.
    fn scenario() -> Snapshot {
        Snapshot::new(
            RepoRef::github("octocat", "Hello-World"),
            vec![label("bug", "d73a4a"), label("enhancement", "a2eeef")],
            vec![
                issue(1, day(2020, 1, 1), Some(day(2020, 1, 10)), &["bug"]),
                issue(2, day(2020, 1, 5), None, &["bug", "enhancement"]),
            ],
            day(2021, 1, 1),
        )
    }

    fn brute_force(snapshot: &Snapshot, filter: LabelFilter<'_>) -> Vec<u64> {
        snapshot
            .timeline()
            .instants()
            .iter()
            .map(|t| count_open_at(snapshot.issues(), *t, filter))
            .collect()
    }

    #[test]
    fn test_predicate_half_open_interval() {
        let i = issue(1, day(2020, 1, 1), Some(day(2020, 1, 10)), &["bug"]);
        assert!(!is_open_and_matching(&i, day(2019, 12, 31), LabelFilter::Total));
        assert!(is_open_and_matching(&i, day(2020, 1, 1), LabelFilter::Total));
        assert!(is_open_and_matching(&i, day(2020, 1, 9), LabelFilter::Single("bug")));
        assert!(!is_open_and_matching(&i, day(2020, 1, 10), LabelFilter::Total));
        assert!(!is_open_and_matching(&i, day(2020, 1, 5), LabelFilter::Single("docs")));
    }

    #[test]
    fn test_predicate_and_mode() {
        let i = issue(1, day(2020, 1, 1), None, &["bug", "enhancement"]);
        let both = names(&["bug", "enhancement"]);
        let extra = names(&["bug", "docs"]);
        assert!(is_open_and_matching(&i, day(2020, 2, 1), LabelFilter::All(&both)));
        assert!(!is_open_and_matching(&i, day(2020, 2, 1), LabelFilter::All(&extra)));
        assert!(!is_open_and_matching(&i, day(2020, 2, 1), LabelFilter::All(&[])));
    }

    #[test]
    fn test_scenario_or_series_for_bug() {
        let snapshot = scenario();
        let mut cache = SeriesCache::new();
        assert_eq!(cache.label_series(&snapshot, "bug"), vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_scenario_and_series() {
        let snapshot = scenario();
        let series = and_series(&snapshot, &names(&["bug", "enhancement"]));
        // Issue 2 is never closed, so it stays counted after issue 1 closes.
        assert_eq!(series.data, vec![0, 1, 1, 1]);
        assert_eq!(series.label, "bug, enhancement");
    }

    #[test]
    fn test_and_series_with_empty_selection_is_all_zero() {
        let snapshot = scenario();
        let series = and_series(&snapshot, &[]);
        assert_eq!(series.data, vec![0; snapshot.timeline().len()]);
    }

    #[test]
    fn test_and_series_with_total_and_labels_is_all_zero() {
        let snapshot = scenario();
        let mixed = and_series(&snapshot, &names(&[TOTAL_LABEL, "bug"]));
        assert_eq!(mixed.data, vec![0, 0, 0, 0]);
        assert_eq!(mixed.label, "__total, bug");
    }

    #[test]
    fn test_and_series_with_only_total_is_total() {
        let snapshot = scenario();
        let only_total = and_series(&snapshot, &names(&[TOTAL_LABEL]));
        assert_eq!(only_total.data, brute_force(&snapshot, LabelFilter::Total));
        assert_eq!(only_total.data, vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_counts_zero_before_first_issue() {
        let snapshot = scenario();
        for filter in [LabelFilter::Total, LabelFilter::Single("bug")] {
            assert_eq!(count_open_at(snapshot.issues(), day(2019, 6, 1), filter), 0);
        }
    }

    #[test]
    fn test_total_series_ends_at_open_issue_count() {
        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![],
            vec![
                issue(1, day(2020, 1, 1), Some(day(2020, 3, 1)), &[]),
                issue(2, day(2020, 2, 1), None, &[]),
                issue(3, day(2020, 2, 15), None, &["bug"]),
                issue(4, day(2020, 4, 1), Some(day(2020, 4, 2)), &["bug"]),
            ],
            day(2021, 1, 1),
        );
        let mut cache = SeriesCache::new();

        let total = cache.label_series(&snapshot, TOTAL_LABEL);

        assert_eq!(total.last().copied(), Some(snapshot.open_issue_count()));
        assert_eq!(snapshot.open_issue_count(), 2);
    }

    #[test]
    fn test_sweep_matches_brute_force() {
        let snapshot = Snapshot::new(
            RepoRef::github("o", "r"),
            vec![],
            vec![
                issue(1, day(2020, 1, 1) + chrono::Duration::hours(9), Some(day(2020, 1, 1) + chrono::Duration::hours(20)), &["a"]),
                issue(2, day(2020, 1, 3) + chrono::Duration::hours(5), None, &["a", "b"]),
                issue(3, day(2020, 1, 2), Some(day(2020, 1, 8) + chrono::Duration::hours(1)), &["b"]),
                issue(4, day(2020, 1, 8), Some(day(2020, 1, 8) + chrono::Duration::minutes(30)), &["a"]),
                issue(5, day(2020, 1, 4) + chrono::Duration::hours(23), Some(day(2020, 2, 1)), &[]),
            ],
            day(2020, 3, 1) + chrono::Duration::hours(7),
        );
        let ab = names(&["a", "b"]);

        for filter in [
            LabelFilter::Total,
            LabelFilter::Single("a"),
            LabelFilter::Single("b"),
            LabelFilter::Single("missing"),
            LabelFilter::All(&ab),
        ] {
            assert_eq!(
                compute_series(snapshot.issues(), snapshot.timeline(), filter),
                brute_force(&snapshot, filter),
                "filter {filter:?}"
            );
        }
    }

    #[test]
    fn test_cache_returns_independent_copies() {
        let snapshot = scenario();
        let mut cache = SeriesCache::new();

        let mut first = cache.label_series(&snapshot, "bug");
        first[0] = 99;
        let second = cache.label_series(&snapshot, "bug");

        assert_eq!(second, vec![1, 2, 1, 1]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_cleared_for_new_snapshot() {
        let old = scenario();
        let new = scenario();
        let mut cache = SeriesCache::new();

        cache.label_series(&old, "bug");
        assert!(cache.contains(&old, "bug"));

        cache.label_series(&new, "enhancement");
        assert!(!cache.contains(&new, "bug"));
        assert!(cache.contains(&new, "enhancement"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_chart_or_mode_uses_label_colors_in_selection_order() {
        let snapshot = scenario();
        let mut cache = SeriesCache::new();
        let selection = Selection::initial()
            .reduce(SelectionAction::Toggle("enhancement".to_string()))
            .reduce(SelectionAction::Toggle("bug".to_string()));

        let chart = build_chart(&snapshot, &selection, &mut cache);

        let legend: Vec<(&str, &str)> = chart
            .series
            .iter()
            .map(|s| (s.label.as_str(), s.color.as_str()))
            .collect();
        assert_eq!(
            legend,
            vec![
                (TOTAL_LABEL, TOTAL_LABEL_COLOR),
                ("enhancement", "a2eeef"),
                ("bug", "d73a4a"),
            ]
        );
        assert_eq!(chart.open_issues, 1);
        assert_eq!(chart.timeline.len(), 4);
    }

    #[test]
    fn test_mode_round_trip_keeps_cache() {
        let snapshot = scenario();
        let mut cache = SeriesCache::new();
        let or_selection = Selection::initial().reduce(SelectionAction::Toggle("bug".to_string()));

        let before = build_chart(&snapshot, &or_selection, &mut cache);
        let and_selection = or_selection
            .clone()
            .reduce(SelectionAction::SetMode(SelectionMode::And));
        let and_chart = build_chart(&snapshot, &and_selection, &mut cache);
        let after = build_chart(
            &snapshot,
            &and_selection.reduce(SelectionAction::SetMode(SelectionMode::Or)),
            &mut cache,
        );

        assert_eq!(and_chart.series.len(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(before.series, after.series);
    }
}
