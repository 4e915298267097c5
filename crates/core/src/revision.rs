//! Revision resolution: branch names and commit ids to concrete commits.
//!
//! A revision string is resolved by trying an ordered list of strategies;
//! the first one that succeeds wins. References are tried before raw
//! object ids, so a branch whose name happens to be valid hex still resolves
//! as the branch.

use git2::{AnnotatedCommit, Branch, Commit, Oid, Reference, Repository};
use tracing::debug;

use crate::errors::{engine_message, GitError};

/// A revision string resolved to a commit.
pub struct ResolvedCommit<'repo> {
    revision: String,
    short_name: Option<String>,
    annotated: AnnotatedCommit<'repo>,
    commit: Commit<'repo>,
}

impl<'repo> ResolvedCommit<'repo> {
    /// The revision string exactly as the caller supplied it.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Short branch name, when the revision resolved through a reference.
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Label used in report output: the short name if there is one,
    /// otherwise the raw revision string.
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.revision)
    }

    pub fn annotated(&self) -> &AnnotatedCommit<'repo> {
        &self.annotated
    }

    pub fn commit(&self) -> &Commit<'repo> {
        &self.commit
    }

    pub fn id(&self) -> Oid {
        self.commit.id()
    }
}

impl std::fmt::Debug for ResolvedCommit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCommit")
            .field("revision", &self.revision)
            .field("short_name", &self.short_name)
            .field("id", &self.commit.id())
            .finish()
    }
}

/// What a strategy hands back before the commit itself is looked up.
struct Candidate<'repo> {
    short_name: Option<String>,
    annotated: AnnotatedCommit<'repo>,
}

type Strategy = for<'repo> fn(&'repo Repository, &str) -> Result<Candidate<'repo>, git2::Error>;

/// Resolution order.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("reference", by_reference as Strategy),
    ("object id", by_object_id as Strategy),
];

/// Resolve `revision` to a commit.
///
/// Fails with [`GitError::RevisionNotFound`] when no strategy matches. A
/// strategy that matches but whose target cannot be loaded as a commit is an
/// engine error.
pub fn resolve<'repo>(
    repo: &'repo Repository,
    revision: &str,
) -> Result<ResolvedCommit<'repo>, GitError> {
    let mut last_err = None;
    for (name, strategy) in STRATEGIES {
        match strategy(repo, revision) {
            Ok(candidate) => {
                debug!(revision, strategy = *name, "revision resolved");
                let commit = repo
                    .find_commit(candidate.annotated.id())
                    .map_err(GitError::engine("looking up commit"))?;
                return Ok(ResolvedCommit {
                    revision: revision.to_string(),
                    short_name: candidate.short_name,
                    annotated: candidate.annotated,
                    commit,
                });
            }
            Err(e) => {
                debug!(revision, strategy = *name, error = %e.message(), "strategy did not match");
                last_err = Some(e);
            }
        }
    }

    Err(GitError::RevisionNotFound {
        revision: revision.to_string(),
        detail: last_err
            .as_ref()
            .map(engine_message)
            .unwrap_or_else(|| "no resolution strategy matched".to_string()),
    })
}

/// Look the string up as a reference: full names directly, short names
/// (`main`, `origin/main`, `v1.0`) with git's usual expansion rules.
fn by_reference<'repo>(
    repo: &'repo Repository,
    revision: &str,
) -> Result<Candidate<'repo>, git2::Error> {
    let reference = match repo.find_reference(revision) {
        Ok(r) => r,
        Err(_) => repo.resolve_reference_from_short_name(revision)?,
    };
    let annotated = repo.reference_to_annotated_commit(&reference)?;
    let short_name = short_name_of(reference)?;
    Ok(Candidate {
        short_name: Some(short_name),
        annotated,
    })
}

/// Parse the string as an object id and look the commit up directly.
fn by_object_id<'repo>(
    repo: &'repo Repository,
    revision: &str,
) -> Result<Candidate<'repo>, git2::Error> {
    let oid = Oid::from_str(revision)?;
    let annotated = repo.find_annotated_commit(oid)?;
    Ok(Candidate {
        short_name: None,
        annotated,
    })
}

/// Branch name without its `refs/heads/` or `refs/remotes/` prefix; other
/// references fall back to their shorthand.
fn short_name_of(reference: Reference<'_>) -> Result<String, git2::Error> {
    if reference.is_branch() || reference.is_remote() {
        let branch = Branch::wrap(reference);
        if let Some(name) = branch.name()? {
            return Ok(name.to_string());
        }
        return Ok(String::from_utf8_lossy(branch.name_bytes()?).into_owned());
    }
    Ok(reference
        .shorthand()
        .map(str::to_string)
        .unwrap_or_else(|| String::from_utf8_lossy(reference.shorthand_bytes()).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn repo_with_commit() -> (tempfile::TempDir, Repository, Oid) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = {
            let sig = Signature::now("Test", "test@test.com").unwrap();
            let tree_oid = repo.treebuilder(None).unwrap().write().unwrap();
            let tree = repo.find_tree(tree_oid).unwrap();
            let oid = repo.commit(None, &sig, &sig, "root", &tree, &[]).unwrap();
            let commit = repo.find_commit(oid).unwrap();
            repo.branch("feature/login", &commit, false).unwrap();
            oid
        };
        (dir, repo, oid)
    }

    #[test]
    fn test_full_ref_name_resolves_with_short_name() {
        let (_dir, repo, oid) = repo_with_commit();
        let resolved = resolve(&repo, "refs/heads/feature/login").unwrap();
        assert_eq!(resolved.id(), oid);
        assert_eq!(resolved.short_name(), Some("feature/login"));
        assert_eq!(resolved.display_name(), "feature/login");
        assert_eq!(resolved.revision(), "refs/heads/feature/login");
    }

    #[test]
    fn test_short_branch_name_resolves() {
        let (_dir, repo, oid) = repo_with_commit();
        let resolved = resolve(&repo, "feature/login").unwrap();
        assert_eq!(resolved.id(), oid);
        assert_eq!(resolved.short_name(), Some("feature/login"));
    }

    #[test]
    fn test_object_id_resolves_without_short_name() {
        let (_dir, repo, oid) = repo_with_commit();
        let sha = oid.to_string();
        let resolved = resolve(&repo, &sha).unwrap();
        assert_eq!(resolved.id(), oid);
        assert_eq!(resolved.short_name(), None);
        assert_eq!(resolved.display_name(), sha);
    }

    #[test]
    fn test_unknown_revision_fails() {
        let (_dir, repo, _) = repo_with_commit();
        let err = resolve(&repo, "no-such-branch").unwrap_err();
        assert!(matches!(
            err,
            GitError::RevisionNotFound { ref revision, .. } if revision == "no-such-branch"
        ));
    }

    #[test]
    fn test_well_formed_but_missing_object_id_fails() {
        let (_dir, repo, _) = repo_with_commit();
        let missing = "0123456789abcdef0123456789abcdef01234567";
        assert!(matches!(
            resolve(&repo, missing),
            Err(GitError::RevisionNotFound { .. })
        ));
    }
}
