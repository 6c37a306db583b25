// SPDX-License-Identifier: Apache-2.0

//! GraphQL queries for GitHub API.
//!
//! Labels come from a cursor-paginated `labels` connection. The issue and
//! pull request totals size the REST page fan-out in [`super::issues`].

use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::model::{Label, RepoRef};

const LABELS_QUERY: &str = r"
query ($owner: String!, $name: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    labels(first: 100, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        color
        issues(states: OPEN) { totalCount }
      }
    }
  }
}";

const TOTALS_QUERY: &str = r"
query ($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    issues { totalCount }
    pullRequests { totalCount }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Count {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
    color: String,
    issues: Count,
}

impl From<LabelNode> for Label {
    fn from(node: LabelNode) -> Self {
        Label {
            name: node.name,
            color: node.color,
            open_issue_count: node.issues.total_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelConnection {
    page_info: PageInfo,
    nodes: Vec<LabelNode>,
}

#[derive(Debug, Deserialize)]
struct LabelsRepository {
    labels: LabelConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalsRepository {
    issues: Count,
    pull_requests: Count,
}

fn build_query(query: &str, repo: &RepoRef, after: Option<&str>) -> Value {
    json!({
        "query": query,
        "variables": {
            "owner": repo.owner,
            "name": repo.name,
            "after": after,
        }
    })
}

/// Runs a query and returns its `data.repository` object.
///
/// A non-empty `errors` array becomes [`FetchError::Query`].
async fn query_repository(client: &Octocrab, payload: &Value) -> Result<Value, FetchError> {
    let response: Value = client.graphql(payload).await?;
    extract_repository(response)
}

fn extract_repository(mut response: Value) -> Result<Value, FetchError> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let messages = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string()
            })
            .collect();
        return Err(FetchError::Query { messages });
    }

    let repository = response
        .get_mut("data")
        .and_then(|data| data.get_mut("repository"))
        .map(Value::take)
        .ok_or_else(|| FetchError::unknown("Missing 'data' field in GraphQL response"))?;

    if repository.is_null() {
        return Err(FetchError::Query {
            messages: vec!["Could not resolve to a Repository".to_string()],
        });
    }
    Ok(repository)
}

/// Fetches every label of a repository, following `endCursor` until
/// `hasNextPage` is false.
#[instrument(skip(client), fields(repo = %repo))]
pub async fn fetch_all_labels(client: &Octocrab, repo: &RepoRef) -> Result<Vec<Label>, FetchError> {
    collect_label_pages(|after| async move {
        let payload = build_query(LABELS_QUERY, repo, after.as_deref());
        let data: LabelsRepository =
            serde_json::from_value(query_repository(client, &payload).await?)?;
        Ok(data.labels)
    })
    .await
}

/// Drives the cursor loop over `fetch_page`, which receives the cursor to
/// resume after (`None` for the first page).
///
/// Stops when a page reports no next page or no end cursor.
async fn collect_label_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<Label>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<LabelConnection, FetchError>>,
{
    let mut labels = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let connection = fetch_page(after.take()).await?;

        labels.extend(connection.nodes.into_iter().map(Label::from));
        debug!(fetched = labels.len(), "Fetched label page");

        match connection.page_info {
            PageInfo {
                has_next_page: true,
                end_cursor: Some(cursor),
            } => after = Some(cursor),
            _ => break,
        }
    }

    Ok(labels)
}

/// Number of issues plus pull requests, which is what the REST issues
/// endpoint pages over.
#[instrument(skip(client), fields(repo = %repo))]
pub async fn fetch_issue_and_pr_total(client: &Octocrab, repo: &RepoRef) -> Result<u64, FetchError> {
    let payload = build_query(TOTALS_QUERY, repo, None);
    let data: TotalsRepository = serde_json::from_value(query_repository(client, &payload).await?)?;

    let total = data.issues.total_count + data.pull_requests.total_count;
    debug!(
        issues = data.issues.total_count,
        pull_requests = data.pull_requests.total_count,
        "Fetched totals"
    );
    Ok(total)
}
