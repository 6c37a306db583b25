// SPDX-License-Identifier: Apache-2.0

//! Chart command.

use anyhow::{Context, Result};
use issuetrend_core::{
    AppConfig, FileStore, IssueTrendError, SelectionAction, SelectionMode, Session, Snapshot,
    TOTAL_LABEL, persisted_mode, remember, resolve_repository,
};
use tracing::debug;

use super::fetch_with_progress;
use super::types::ChartResult;
use crate::cli::{ChartArgs, OutputContext};

/// Selection actions for the requested labels, on top of the initial selection.
///
/// Duplicates and the total label are skipped; `hide_total` toggles the total off.
fn selection_actions(
    labels: &[String],
    mode: SelectionMode,
    hide_total: bool,
) -> Vec<SelectionAction> {
    let mut actions = vec![SelectionAction::SetMode(mode)];
    if hide_total {
        actions.push(SelectionAction::Toggle(TOTAL_LABEL.to_string()));
    }

    let mut seen: Vec<&str> = Vec::new();
    for label in labels {
        if label == TOTAL_LABEL || seen.contains(&label.as_str()) {
            continue;
        }
        seen.push(label.as_str());
        actions.push(SelectionAction::Toggle(label.clone()));
    }
    actions
}

fn check_labels(snapshot: &Snapshot, labels: &[String]) -> Result<(), IssueTrendError> {
    match labels.iter().find(|name| snapshot.label(name).is_none()) {
        Some(name) => Err(IssueTrendError::UnknownLabel { name: name.clone() }),
        None => Ok(()),
    }
}

/// Fetches the repository and computes the chart for the requested selection.
pub async fn run(args: ChartArgs, ctx: &OutputContext, config: &AppConfig) -> Result<ChartResult> {
    let mut store = FileStore::load_default()?;
    let target = resolve_repository(args.repo.repo.as_deref(), &store, config)?;
    let mode = args.mode.map_or_else(|| persisted_mode(&store), SelectionMode::from);

    let mut session = Session::new();
    let snapshot = fetch_with_progress(&mut session, &target, !args.repo.no_cache, ctx, config)
        .await?;
    check_labels(&snapshot, &args.labels)?;

    for action in selection_actions(&args.labels, mode, args.hide_total) {
        session.select(action);
    }
    debug!(selection = ?session.state().selection, "Selection applied");

    let chart = session.chart().context("No repository data loaded")?;

    remember(&mut store, &target, mode);
    store.save()?;
    debug!(path = %store.path().display(), "Saved state");

    Ok(ChartResult {
        chart,
        rows: args.rows,
    })
}
