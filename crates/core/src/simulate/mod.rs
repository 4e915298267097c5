//! Trial integrations: in-memory merges and rebases.
//!
//! Neither simulator touches the working tree, the on-disk index or any
//! reference. Each returns a [`SimulationReport`] whose [`total`] is the
//! number of conflicts a real merge or rebase would stop on.
//!
//! [`total`]: SimulationReport::total

pub mod merge;
pub mod rebase;

pub use merge::simulate_merge;
pub use rebase::simulate_rebase;

use git2::Index;
use serde::Serialize;
use tracing::{debug, warn};

use crate::conflict::{ConflictEntry, ConflictKind};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which kind of integration was simulated.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Merge,
    Rebase,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// One classified conflict.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConflictRecord {
    pub path: String,
    #[serde(flatten)]
    pub kind: ConflictKind,
    /// The line a real `git merge` / `git rebase` would print.
    pub message: String,
    /// Summary of the replayed commit, for rebase steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

/// Outcome of a trial merge or rebase.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub operation: Operation,
    pub conflicts: Vec<ConflictRecord>,
    /// Rebase steps applied; always zero for a merge.
    pub steps: usize,
    /// Non-fatal problems hit while walking conflicts.
    pub warnings: Vec<String>,
}

impl SimulationReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            conflicts: Vec::new(),
            steps: 0,
            warnings: Vec::new(),
        }
    }

    /// Total number of conflicts found.
    pub fn total(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Conflict walk
// ---------------------------------------------------------------------------

/// Walk every conflict in `index`, classify it and append it to `report`.
///
/// Iterator exhaustion ends the walk normally. Failing to open the
/// iterator, or an error part-way through, is recorded as a warning and
/// ends the walk; conflicts already collected stay counted.
pub(crate) fn collect_conflicts(
    index: &Index,
    our_label: &str,
    their_label: &str,
    step: Option<&str>,
    report: &mut SimulationReport,
) -> usize {
    let before = report.conflicts.len();

    let conflicts = match index.conflicts() {
        Ok(iter) => iter,
        Err(e) => {
            warn!(error = %e, "an error occurred while reading conflicts");
            report
                .warnings
                .push(format!("could not read conflicts: {}", e.message()));
            return 0;
        }
    };

    for conflict in conflicts {
        let conflict = match conflict {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "an error occurred while reading conflicts");
                report
                    .warnings
                    .push(format!("conflict iteration stopped early: {}", e.message()));
                break;
            }
        };
        let Some(entry) = ConflictEntry::from_index_conflict(&conflict) else {
            continue;
        };
        let record = ConflictRecord {
            path: entry.path().to_string(),
            kind: entry.classify(),
            message: entry.render(our_label, their_label),
            step: step.map(str::to_string),
        };
        debug!(path = %record.path, kind = %record.kind, "conflict");
        report.conflicts.push(record);
    }

    report.conflicts.len() - before
}
