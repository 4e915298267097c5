//! Step-by-step in-memory rebase.

use git2::{ErrorCode, RebaseOptions, Repository};
use tracing::{debug, info, instrument};

use crate::errors::GitError;
use crate::revision;

use super::{collect_conflicts, Operation, SimulationReport};

/// Replay the commits of `branch` that are not in `upstream` on top of
/// `onto` (or `upstream` when no onto is given), entirely in memory.
///
/// Every step is applied even when an earlier one conflicted, so the report
/// covers the whole branch. Each step's index is inspected and dropped
/// before the next operation is requested. Conflicts are labelled with the
/// replayed commit's summary on both sides.
///
/// A clean step is committed into the session so the next step is merged
/// against its result, as a real rebase would. Those commits only land in
/// the object store; no reference is moved. A conflicting step is left
/// uncommitted and the next step builds on the last clean one.
#[instrument(skip(repo))]
pub fn simulate_rebase(
    repo: &Repository,
    upstream: &str,
    branch: &str,
    onto: Option<&str>,
) -> Result<SimulationReport, GitError> {
    let upstream = revision::resolve(repo, upstream)?;
    let branch = revision::resolve(repo, branch)?;
    let onto = onto.map(|rev| revision::resolve(repo, rev)).transpose()?;

    let mut opts = RebaseOptions::new();
    opts.inmemory(true);

    let mut rebase = repo
        .rebase(
            Some(branch.annotated()),
            Some(upstream.annotated()),
            onto.as_ref().map(|o| o.annotated()),
            Some(&mut opts),
        )
        .map_err(GitError::engine("starting in-memory rebase"))?;

    info!(
        operations = rebase.len(),
        branch = %branch.id(),
        upstream = %upstream.id(),
        "starting rebase"
    );

    let mut report = SimulationReport::new(Operation::Rebase);
    while let Some(operation) = rebase.next() {
        let id = operation
            .map_err(GitError::engine("applying rebase operation"))?
            .id();
        let commit = repo
            .find_commit(id)
            .map_err(GitError::engine("looking up rebased commit"))?;
        let summary = commit.summary().unwrap_or_default().to_string();
        info!(commit = %id, "applying commit \"{}\"", summary);
        report.steps += 1;

        let conflicted = {
            let index = rebase
                .inmemory_index()
                .map_err(GitError::engine("reading rebase step index"))?;
            if index.has_conflicts() {
                let found =
                    collect_conflicts(&index, &summary, &summary, Some(&summary), &mut report);
                debug!(commit = %id, conflicts = found, "step has conflicts");
                true
            } else {
                false
            }
        };
        if conflicted {
            continue;
        }

        let committer = commit.committer().to_owned();
        match rebase.commit(None, &committer, None) {
            Ok(rewritten) => debug!(commit = %id, %rewritten, "step applied"),
            Err(e) if e.code() == ErrorCode::Applied => {
                debug!(commit = %id, "changes already present upstream, skipping");
            }
            Err(e) => return Err(GitError::engine("committing rebase step")(e)),
        }
    }

    rebase
        .finish(None)
        .map_err(GitError::engine("finishing rebase"))?;

    info!(
        steps = report.steps,
        conflicts = report.total(),
        "finished rebasing"
    );
    Ok(report)
}
