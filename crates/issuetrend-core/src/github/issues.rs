// SPDX-License-Identifier: Apache-2.0

//! REST issue pages.
//!
//! The issues endpoint lists pull requests too, so the page count is derived
//! from the combined total and pull requests are dropped after download.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::ProgressFn;
use crate::error::FetchError;
use crate::model::{Issue, RepoRef};

#[derive(Debug, Serialize)]
struct PageParams {
    state: &'static str,
    direction: &'static str,
    per_page: u32,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct RestLabel {
    name: String,
}

/// An entry of the REST issues listing.
#[derive(Debug, Deserialize)]
struct RestIssue {
    number: u64,
    #[serde(default)]
    title: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<RestLabel>,
    pull_request: Option<Value>,
}

impl From<RestIssue> for Issue {
    fn from(raw: RestIssue) -> Self {
        Issue::builder()
            .number(raw.number)
            .title(raw.title)
            .created_at(raw.created_at)
            .maybe_closed_at(raw.closed_at)
            .labels(raw.labels.into_iter().map(|l| l.name).collect::<BTreeSet<_>>())
            .build()
    }
}

/// Pages needed to list `total` entries at `page_size` per page.
fn page_count(total: u64, page_size: u32) -> u32 {
    let pages = total.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Percentage of pages received, rounded down.
fn progress_percent(loaded: u32, pages: u32) -> u8 {
    if pages == 0 {
        return 100;
    }
    let percent = u64::from(loaded) * 100 / u64::from(pages);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

fn without_pull_requests(page: Vec<RestIssue>) -> impl Iterator<Item = Issue> {
    page.into_iter()
        .filter(|entry| entry.pull_request.is_none())
        .map(Issue::from)
}

async fn fetch_page(
    client: &Octocrab,
    repo: &RepoRef,
    page: u32,
    per_page: u32,
) -> Result<(u32, Vec<RestIssue>), FetchError> {
    let route = format!("/repos/{}/{}/issues", repo.owner, repo.name);
    let params = PageParams {
        state: "all",
        direction: "asc",
        per_page,
        page,
    };

    let entries = client
        .get::<Vec<RestIssue>, _, _>(&route, Some(&params))
        .await?;
    debug!(page, entries = entries.len(), "Fetched issue page");
    Ok((page, entries))
}

/// Runs `fetch` for pages `1..=pages`, at most `max_concurrent` at a time,
/// and returns the page contents in page order.
///
/// Progress is reported as each page completes, in completion order. The
/// first error aborts the remaining pages.
async fn collect_pages<T, F, Fut>(
    pages: u32,
    max_concurrent: usize,
    fetch: F,
    on_progress: ProgressFn<'_>,
) -> Result<Vec<Vec<T>>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(u32, Vec<T>), FetchError>>,
{
    let mut loaded = 0u32;
    let mut received: Vec<(u32, Vec<T>)> = stream::iter(1..=pages)
        .map(fetch)
        .buffer_unordered(max_concurrent.max(1))
        .inspect_ok(|_| {
            loaded += 1;
            on_progress(progress_percent(loaded, pages));
        })
        .try_collect()
        .await?;

    received.sort_by_key(|(page, _)| *page);
    Ok(received.into_iter().map(|(_, entries)| entries).collect())
}

/// Downloads every issue page of `repo`, at most `max_concurrent` at a time.
///
/// `total` is the issue plus pull request count. Progress is reported after
/// each page; with no pages a single 100 is reported. The first failing page
/// aborts the download.
#[instrument(skip(client, on_progress), fields(repo = %repo))]
pub async fn fetch_issue_pages(
    client: &Octocrab,
    repo: &RepoRef,
    total: u64,
    page_size: u32,
    max_concurrent: usize,
    on_progress: ProgressFn<'_>,
) -> Result<Vec<Issue>, FetchError> {
    let pages = page_count(total, page_size);
    debug!(total, pages, "Fetching issue pages");

    if pages == 0 {
        on_progress(100);
        return Ok(Vec::new());
    }

    let received = collect_pages(
        pages,
        max_concurrent,
        |page| fetch_page(client, repo, page, page_size),
        on_progress,
    )
    .await?;

    let issues: Vec<Issue> = received
        .into_iter()
        .flat_map(without_pull_requests)
        .collect();

    debug!(issues = issues.len(), "Fetched all issue pages");
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 100), 0);
        assert_eq!(page_count(1, 100), 1);
        assert_eq!(page_count(100, 100), 1);
        assert_eq!(page_count(201, 100), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_progress_percent_rounds_down() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_pull_requests_are_dropped() {
        let page: Vec<RestIssue> = serde_json::from_value(json!([
            {
                "number": 1,
                "title": "Crash on start",
                "created_at": "2020-01-01T10:00:00Z",
                "closed_at": null,
                "labels": [{ "name": "bug", "color": "d73a4a" }]
            },
            {
                "number": 2,
                "title": "Fix crash",
                "created_at": "2020-01-02T10:00:00Z",
                "closed_at": "2020-01-03T10:00:00Z",
                "labels": [],
                "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/2" }
            }
        ]))
        .unwrap();

        let issues: Vec<Issue> = without_pull_requests(page).collect();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
        assert!(issues[0].has_label("bug"));
        assert!(issues[0].is_open());
    }

    #[test]
    fn test_closed_issue_conversion() {
        let page: Vec<RestIssue> = serde_json::from_value(json!([{
            "number": 9,
            "created_at": "2020-01-01T10:00:00Z",
            "closed_at": "2020-02-01T10:00:00Z"
        }]))
        .unwrap();

        let issue = without_pull_requests(page).next().unwrap();

        assert!(!issue.is_open());
        assert!(issue.labels.is_empty());
        assert!(issue.title.is_empty());
    }

    /// Sleeps longer for lower page numbers so pages finish in reverse order.
    async fn delayed_page(page: u32, pages: u32) -> Result<(u32, Vec<u32>), FetchError> {
        tokio::time::sleep(std::time::Duration::from_millis(u64::from(pages - page) * 10)).await;
        Ok((page, vec![page * 10, page * 10 + 1]))
    }

    #[tokio::test]
    async fn test_out_of_order_pages_are_reordered() {
        let seen = std::sync::Mutex::new(Vec::new());
        let on_progress = |percent: u8| seen.lock().unwrap().push(percent);

        let pages = collect_pages(4, 4, |page| delayed_page(page, 4), &on_progress)
            .await
            .unwrap();

        assert_eq!(
            pages,
            vec![vec![10, 11], vec![20, 21], vec![30, 31], vec![40, 41]]
        );
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![25, 50, 75, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = std::sync::atomic::AtomicUsize::new(0);
        let peak = std::sync::atomic::AtomicUsize::new(0);

        let pages = collect_pages(
            6,
            2,
            |page| {
                let (in_flight, peak) = (&in_flight, &peak);
                async move {
                    use std::sync::atomic::Ordering::SeqCst;
                    let now = in_flight.fetch_add(1, SeqCst) + 1;
                    peak.fetch_max(now, SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, SeqCst);
                    Ok::<_, FetchError>((page, vec![page]))
                }
            },
            &|_| {},
        )
        .await
        .unwrap();

        assert_eq!(pages.len(), 6);
        assert_eq!(peak.into_inner(), 2);
    }

    #[tokio::test]
    async fn test_failing_page_aborts() {
        let result = collect_pages(
            3,
            3,
            |page| async move {
                if page == 2 {
                    Err(FetchError::Http {
                        status: 502,
                        reason: "Bad Gateway".to_string(),
                    })
                } else {
                    delayed_page(page, 3).await
                }
            },
            &|_| {},
        )
        .await;

        assert!(matches!(result, Err(FetchError::Http { status: 502, .. })));
    }

    #[test]
    fn test_page_params_query() {
        let params = PageParams {
            state: "all",
            direction: "asc",
            per_page: 100,
            page: 3,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["state"], "all");
        assert_eq!(value["direction"], "asc");
        assert_eq!(value["page"], 3);
    }
}
