// SPDX-License-Identifier: Apache-2.0

//! Session state container.
//!
//! All transitions go through [`reduce`], a pure function of the current
//! state and an action. Every fetch is tagged with a generation; progress and
//! results from an older generation are dropped, so a slow fetch for one
//! repository can never overwrite the data of a newer one.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::channel::mpsc;
use tracing::{debug, info, warn};

use crate::aggregate::{Chart, SeriesCache, build_chart};
use crate::error::FetchError;
use crate::github::{IssueRepository, ProgressFn, fetch_snapshot};
use crate::model::{RepoRef, Snapshot};
use crate::selection::{Selection, SelectionAction};

/// What the chart area shows.
#[derive(Debug, Clone, Default)]
pub enum ChartState {
    /// Nothing fetched yet, or the last fetch failed.
    #[default]
    AwaitingInput,
    /// A fetch is in flight.
    Loading {
        /// Percentage of issue pages received.
        percent: u8,
    },
    /// Data is available.
    Ready(Arc<Snapshot>),
    /// The last fetch failed; the previous data was discarded.
    Failed {
        /// User-facing error message.
        message: String,
    },
}

/// The whole session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Generation of the most recently started fetch.
    pub generation: u64,
    /// Chart area state.
    pub chart: ChartState,
    /// Current label selection.
    pub selection: Selection,
}

impl SessionState {
    /// The current snapshot, if one is loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match &self.chart {
            ChartState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Inputs to [`reduce`].
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// A new fetch begins; bumps the generation.
    FetchStarted,
    /// Issue page progress for a fetch.
    FetchProgress {
        /// Generation of the reporting fetch.
        generation: u64,
        /// Percentage of pages received.
        percent: u8,
    },
    /// A fetch completed.
    FetchSucceeded {
        /// Generation of the completed fetch.
        generation: u64,
        /// The fetched data.
        snapshot: Arc<Snapshot>,
    },
    /// A fetch failed.
    FetchFailed {
        /// Generation of the failed fetch.
        generation: u64,
        /// User-facing error message.
        message: String,
    },
    /// A selection change.
    Select(SelectionAction),
}

/// Computes the next state.
#[must_use]
pub fn reduce(mut state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::FetchStarted => {
            state.generation += 1;
            state.chart = ChartState::Loading { percent: 0 };
        }
        SessionAction::FetchProgress {
            generation,
            percent,
        } => {
            if generation == state.generation && matches!(state.chart, ChartState::Loading { .. }) {
                state.chart = ChartState::Loading {
                    percent: percent.min(100),
                };
            }
        }
        SessionAction::FetchSucceeded {
            generation,
            snapshot,
        } => {
            if generation == state.generation {
                state.chart = ChartState::Ready(snapshot);
                state.selection = Selection::initial();
            } else {
                debug!(generation, current = state.generation, "Dropping stale fetch result");
            }
        }
        SessionAction::FetchFailed {
            generation,
            message,
        } => {
            if generation == state.generation {
                state.chart = ChartState::Failed { message };
            } else {
                debug!(generation, current = state.generation, "Dropping stale fetch failure");
            }
        }
        SessionAction::Select(action) => {
            state.selection = state.selection.reduce(action);
        }
    }
    state
}

/// Session state plus the series memo for the loaded snapshot.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    cache: SeriesCache,
}

impl Session {
    /// Creates a session with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies an action. Installing a different snapshot drops memoized series.
    pub fn dispatch(&mut self, action: SessionAction) {
        let previous = self.state.snapshot().map(|s| s.id());
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);

        if self.state.snapshot().map(|s| s.id()) != previous {
            self.cache.clear();
        }
    }

    /// Starts a fetch and returns its generation.
    pub fn begin_fetch(&mut self) -> u64 {
        self.dispatch(SessionAction::FetchStarted);
        self.state.generation
    }

    /// Fetches `target` through `repository` and installs the result.
    ///
    /// On failure the chart resets and the error is returned as well.
    pub async fn refresh(
        &mut self,
        repository: &dyn IssueRepository,
        target: &RepoRef,
        on_progress: ProgressFn<'_>,
    ) -> Result<Arc<Snapshot>, FetchError> {
        let generation = self.begin_fetch();
        info!(repo = %target, generation, "Refreshing repository");

        let (tx, mut rx) = mpsc::unbounded::<u8>();
        let forward = move |percent: u8| {
            on_progress(percent);
            let _ = tx.unbounded_send(percent);
        };
        let fetch = fetch_snapshot(repository, target, Utc::now(), &forward);
        tokio::pin!(fetch);

        let result = loop {
            tokio::select! {
                result = &mut fetch => break result,
                Some(percent) = rx.next() => self.record_progress(generation, percent),
            }
        };
        while let Ok(Some(percent)) = rx.try_next() {
            self.record_progress(generation, percent);
        }

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.dispatch(SessionAction::FetchSucceeded {
                    generation,
                    snapshot: Arc::clone(&snapshot),
                });
                Ok(snapshot)
            }
            Err(err) => {
                warn!(repo = %target, error = %err, "Refresh failed");
                self.dispatch(SessionAction::FetchFailed {
                    generation,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Records issue page progress for the fetch tagged `generation`.
    pub fn record_progress(&mut self, generation: u64, percent: u8) {
        self.dispatch(SessionAction::FetchProgress {
            generation,
            percent,
        });
    }

    /// Installs an already available snapshot, e.g. one read from the fetch cache.
    pub fn load(&mut self, snapshot: Arc<Snapshot>) {
        let generation = self.begin_fetch();
        self.dispatch(SessionAction::FetchSucceeded {
            generation,
            snapshot,
        });
    }

    /// Applies a selection change.
    pub fn select(&mut self, action: SelectionAction) {
        self.dispatch(SessionAction::Select(action));
    }

    /// The chart for the current selection, or `None` without data.
    pub fn chart(&mut self) -> Option<Chart> {
        let snapshot = Arc::clone(self.state.snapshot()?);
        Some(build_chart(&snapshot, &self.state.selection, &mut self.cache))
    }

    /// Number of memoized OR-mode series.
    #[must_use]
    pub fn cached_series(&self) -> usize {
        self.cache.len()
    }
}
