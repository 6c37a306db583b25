// SPDX-License-Identifier: Apache-2.0

//! Which labels are charted and how they are combined.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::TOTAL_LABEL;

/// How selected labels turn into series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// One independent series per selected label.
    #[default]
    Or,
    /// A single series of issues carrying every selected label.
    And,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Or => write!(f, "or"),
            SelectionMode::And => write!(f, "and"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "or" => Ok(SelectionMode::Or),
            "and" => Ok(SelectionMode::And),
            other => Err(format!("unknown selection mode '{other}', expected 'or' or 'and'")),
        }
    }
}

/// A change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Remove the label if selected, append it otherwise.
    Toggle(String),
    /// Switch the combination mode. Keeps the selected labels.
    SetMode(SelectionMode),
    /// Back to the post-fetch default.
    Reset,
}

/// Selected labels, in the order they were picked, plus the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    labels: Vec<String>,
    mode: SelectionMode,
}

impl Default for Selection {
    fn default() -> Self {
        Self::initial()
    }
}

impl Selection {
    /// The selection installed after every successful fetch: the total label
    /// in OR mode.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            labels: vec![TOTAL_LABEL.to_string()],
            mode: SelectionMode::Or,
        }
    }

    /// Selected label names in selection order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns true if `label` is selected.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Applies an action, returning the next selection.
    #[must_use]
    pub fn reduce(mut self, action: SelectionAction) -> Self {
        match action {
            SelectionAction::Toggle(label) => {
                if let Some(pos) = self.labels.iter().position(|l| *l == label) {
                    self.labels.remove(pos);
                } else {
                    self.labels.push(label);
                }
                self
            }
            SelectionAction::SetMode(mode) => {
                self.mode = mode;
                self
            }
            SelectionAction::Reset => Self::initial(),
        }
    }
}
