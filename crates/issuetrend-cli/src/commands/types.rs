// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data instead of printing directly; the output
//! module renders them in the requested format.

use issuetrend_core::github::auth::TokenSource;
use issuetrend_core::{Chart, Label, RepoRef};
use serde::Serialize;

/// Result from the auth status command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthStatusResult {
    /// Whether a credential was found.
    pub authenticated: bool,
    /// Where the credential came from (if authenticated).
    pub method: Option<TokenSource>,
    /// "token" or "basic" (if authenticated).
    pub credential_kind: Option<&'static str>,
}

/// Result from the chart command.
#[derive(Debug, Clone, Serialize)]
pub struct ChartResult {
    /// The computed chart.
    #[serde(flatten)]
    pub chart: Chart,
    /// Most recent samples listed in text and markdown tables.
    #[serde(skip)]
    pub rows: usize,
}

/// Result from the labels command.
#[derive(Debug, Clone, Serialize)]
pub struct LabelsResult {
    /// Repository the labels belong to.
    pub repo: RepoRef,
    /// Issues open right now.
    pub open_issues: u64,
    /// Labels, most open issues first, total excluded.
    pub labels: Vec<Label>,
}
