//! Trial three-way merge of two revisions.

use git2::{MergeOptions, Repository};
use tracing::{info, instrument};

use crate::errors::GitError;
use crate::revision;

use super::{collect_conflicts, Operation, SimulationReport};

/// Merge `their` into `our` in memory and report the conflicts.
///
/// Both revisions go through [`revision::resolve`]; a revision that cannot be
/// resolved aborts the simulation. The merge uses libgit2's default
/// strategy and produces an index that is never written anywhere. Conflict
/// lines are labelled with each side's short branch name, falling back to
/// the revision string as given.
#[instrument(skip(repo))]
pub fn simulate_merge(
    repo: &Repository,
    our: &str,
    their: &str,
) -> Result<SimulationReport, GitError> {
    let ours = revision::resolve(repo, our)?;
    let theirs = revision::resolve(repo, their)?;

    info!(
        ours = %ours.id(),
        theirs = %theirs.id(),
        "attempting to merge"
    );

    let opts = MergeOptions::new();
    let index = repo
        .merge_commits(ours.commit(), theirs.commit(), Some(&opts))
        .map_err(GitError::engine("merging commits"))?;

    let mut report = SimulationReport::new(Operation::Merge);
    collect_conflicts(
        &index,
        ours.display_name(),
        theirs.display_name(),
        None,
        &mut report,
    );

    info!(conflicts = report.total(), "finished merging");
    Ok(report)
}
