// SPDX-License-Identifier: Apache-2.0

//! Sampling instants for the open-issue series.
//!
//! Every creation and closing instant is truncated to midnight UTC, so two
//! events on the same calendar day share one sample. The current instant is
//! appended untruncated so the latest partial day is sampled exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::model::Issue;

/// Strictly ascending, duplicate-free, never empty sequence of instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline(Vec<DateTime<Utc>>);

impl Timeline {
    /// The instants, oldest first.
    #[must_use]
    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.0
    }

    /// Number of sample points (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false; a timeline always holds at least `now`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last sample point, i.e. the instant the timeline was built.
    #[must_use]
    pub fn latest(&self) -> DateTime<Utc> {
        // Construction guarantees at least the "now" entry.
        self.0[self.0.len() - 1]
    }

    /// Index of the first sample at or after `instant`.
    ///
    /// Returns `len()` when every sample precedes `instant`.
    #[must_use]
    pub fn first_at_or_after(&self, instant: DateTime<Utc>) -> usize {
        self.0.partition_point(|sample| *sample < instant)
    }
}

/// Truncates an instant to midnight UTC of its calendar date.
#[must_use]
pub fn truncate_to_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Builds the timeline for an issue set.
///
/// Collects the day-truncated creation and closing instants of every issue,
/// adds `now` as-is, then sorts and deduplicates.
pub fn build_timeline(issues: &[Issue], now: DateTime<Utc>) -> Timeline {
    let mut instants: BTreeSet<DateTime<Utc>> = BTreeSet::new();

    for issue in issues {
        instants.insert(truncate_to_day(issue.created_at));
        if let Some(closed_at) = issue.closed_at {
            instants.insert(truncate_to_day(closed_at));
        }
    }
    instants.insert(now);

    debug!(
        issues = issues.len(),
        samples = instants.len(),
        "Built timeline"
    );
    Timeline(instants.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        ymd_hms(y, m, d, 0, 0)
    }

    #[test]
    fn test_truncate_to_day() {
        assert_eq!(truncate_to_day(ymd_hms(2020, 3, 4, 23, 59)), midnight(2020, 3, 4));
        assert_eq!(truncate_to_day(midnight(2020, 3, 4)), midnight(2020, 3, 4));
    }

    #[test]
    fn test_empty_issue_set_yields_now() {
        let now = ymd_hms(2024, 6, 1, 15, 30);
        let timeline = build_timeline(&[], now);
        assert_eq!(timeline.instants(), &[now]);
        assert_eq!(timeline.latest(), now);
        assert!(!timeline.is_empty());
    }

    #[test]
    fn test_same_day_events_collapse() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(ymd_hms(2020, 1, 1, 8, 0))
                .closed_at(ymd_hms(2020, 1, 3, 9, 0))
                .build(),
            Issue::builder()
                .number(2)
                .created_at(ymd_hms(2020, 1, 1, 17, 0))
                .closed_at(ymd_hms(2020, 1, 3, 22, 0))
                .build(),
        ];
        let now = ymd_hms(2021, 1, 1, 10, 0);

        let timeline = build_timeline(&issues, now);

        assert_eq!(
            timeline.instants(),
            &[midnight(2020, 1, 1), midnight(2020, 1, 3), now]
        );
    }

    #[test]
    fn test_now_is_not_truncated() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(ymd_hms(2024, 6, 1, 8, 0))
                .build(),
        ];
        let now = ymd_hms(2024, 6, 1, 15, 30);

        let timeline = build_timeline(&issues, now);

        assert_eq!(timeline.instants(), &[midnight(2024, 6, 1), now]);
    }

    #[test]
    fn test_now_at_midnight_is_deduplicated() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(ymd_hms(2024, 6, 1, 8, 0))
                .build(),
        ];
        let now = midnight(2024, 6, 1);

        let timeline = build_timeline(&issues, now);

        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_strictly_ascending_regardless_of_input_order() {
        let issues = vec![
            Issue::builder()
                .number(3)
                .created_at(ymd_hms(2022, 5, 1, 1, 0))
                .build(),
            Issue::builder()
                .number(1)
                .created_at(ymd_hms(2019, 2, 1, 1, 0))
                .closed_at(ymd_hms(2023, 1, 1, 1, 0))
                .build(),
            Issue::builder()
                .number(2)
                .created_at(ymd_hms(2020, 7, 9, 1, 0))
                .closed_at(ymd_hms(2020, 7, 9, 3, 0))
                .build(),
        ];

        let timeline = build_timeline(&issues, ymd_hms(2024, 1, 1, 0, 30));

        assert_eq!(timeline.len(), 5);
        assert!(timeline.instants().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_first_at_or_after() {
        let issues = vec![
            Issue::builder()
                .number(1)
                .created_at(midnight(2020, 1, 1))
                .closed_at(midnight(2020, 1, 10))
                .build(),
        ];
        let timeline = build_timeline(&issues, midnight(2020, 2, 1));

        assert_eq!(timeline.first_at_or_after(midnight(2019, 1, 1)), 0);
        assert_eq!(timeline.first_at_or_after(midnight(2020, 1, 1)), 0);
        assert_eq!(timeline.first_at_or_after(ymd_hms(2020, 1, 1, 0, 1)), 1);
        assert_eq!(timeline.first_at_or_after(midnight(2021, 1, 1)), 3);
    }
}
