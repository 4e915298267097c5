//! Local Git repository operations via `git2`.

use std::path::{Path, PathBuf};

use git2::{Cred, ErrorCode, FetchOptions, Remote, RemoteCallbacks, Repository};
use tracing::{debug, info, instrument};

use crate::errors::GitError;
use crate::git::remote_url::same_remote_url;
use crate::simulate::{self, SimulationReport};

/// High-level Git client wrapping a `git2::Repository`.
pub struct GitClient {
    repo: Repository,
    repo_path: PathBuf,
}

impl GitClient {
    /// Open an existing Git repository at `repo_path`.
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self, GitError> {
        let path = repo_path.as_ref();
        info!(path = %path.display(), "opening repository");
        let repo = Repository::open(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self {
            repo,
            repo_path: path.to_path_buf(),
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Make sure a remote called `name` points at `url`, creating it if it
    /// does not exist yet.
    ///
    /// An existing remote with a different URL is an error; it is never
    /// repointed.
    #[instrument(skip(self))]
    pub fn ensure_remote(&self, name: &str, url: &str) -> Result<Remote<'_>, GitError> {
        info!("checking if remote already exists");
        match self.repo.find_remote(name) {
            Ok(remote) => {
                let existing = remote.url().unwrap_or_default().to_string();
                if !same_remote_url(&existing, url) {
                    return Err(GitError::RemoteUrlMismatch {
                        name: name.to_string(),
                        existing,
                        requested: url.to_string(),
                    });
                }
                info!("remote already exists with the provided url");
                Ok(remote)
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                info!("adding remote");
                self.repo
                    .remote(name, url)
                    .map_err(GitError::engine("adding remote"))
            }
            Err(e) => Err(GitError::engine("looking up remote")(e)),
        }
    }

    /// Fetch the default refspecs of a named remote.
    #[instrument(skip(self, token))]
    pub fn fetch(&self, remote_name: &str, token: Option<&str>) -> Result<(), GitError> {
        info!("fetching remote");
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(GitError::engine("looking up remote"))?;
        let mut callbacks = RemoteCallbacks::new();
        if let Some(tok) = token {
            let tok = tok.to_string();
            callbacks.credentials(move |_url, _username, _allowed| {
                Cred::userpass_plaintext("x-access-token", &tok)
            });
        }
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);
        remote
            .fetch(&[] as &[&str], Some(&mut fetch_opts), None)
            .map_err(GitError::engine("fetching remote"))?;
        let stats = remote.stats();
        debug!(
            received_objects = stats.received_objects(),
            received_bytes = stats.received_bytes(),
            "fetch completed"
        );
        Ok(())
    }

    /// Add (or reuse) a remote and fetch it so its branches can be used as
    /// revisions. This is the only operation that changes the repository.
    pub fn add_and_fetch_remote(
        &self,
        name: &str,
        url: &str,
        token: Option<&str>,
    ) -> Result<(), GitError> {
        self.ensure_remote(name, url)?;
        self.fetch(name, token)
    }

    /// Trial-merge `their` into `our`. See [`simulate::simulate_merge`].
    pub fn simulate_merge(&self, our: &str, their: &str) -> Result<SimulationReport, GitError> {
        simulate::simulate_merge(&self.repo, our, their)
    }

    /// Trial-rebase `branch` onto `upstream` / `onto`. See
    /// [`simulate::simulate_rebase`].
    pub fn simulate_rebase(
        &self,
        upstream: &str,
        branch: &str,
        onto: Option<&str>,
    ) -> Result<SimulationReport, GitError> {
        simulate::simulate_rebase(&self.repo, upstream, branch, onto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn init_with_branch(path: &Path, branch: &str) {
        let repo = Repository::init(path).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let tree_oid = repo.treebuilder(None).unwrap().write().unwrap();
        let tree = repo.find_tree(tree_oid).unwrap();
        let oid = repo.commit(None, &sig, &sig, "root", &tree, &[]).unwrap();
        let commit = repo.find_commit(oid).unwrap();
        repo.branch(branch, &commit, false).unwrap();
    }

    #[test]
    fn test_repo_not_found() {
        assert!(matches!(
            GitClient::open("/nonexistent"),
            Err(GitError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_ensure_remote_creates_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let client = GitClient::open(dir.path()).unwrap();

        client.ensure_remote("upstream", "https://example.com/repo.git").unwrap();
        let remote = client
            .ensure_remote("upstream", "https://example.com/repo.git/")
            .unwrap();
        assert_eq!(remote.url(), Some("https://example.com/repo.git"));
    }

    #[test]
    fn test_ensure_remote_rejects_different_url() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let client = GitClient::open(dir.path()).unwrap();

        client.ensure_remote("upstream", "https://example.com/a.git").unwrap();
        let err = client
            .ensure_remote("upstream", "https://example.com/b.git")
            .err()
            .expect("expected RemoteUrlMismatch error");
        match err {
            GitError::RemoteUrlMismatch { existing, .. } => {
                assert_eq!(existing, "https://example.com/a.git")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_add_and_fetch_local_remote() {
        let source = tempfile::tempdir().unwrap();
        init_with_branch(source.path(), "feature");

        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let client = GitClient::open(dir.path()).unwrap();

        let url = source.path().to_str().unwrap();
        client.add_and_fetch_remote("upstream", url, None).unwrap();
        assert!(client
            .repo()
            .find_reference("refs/remotes/upstream/feature")
            .is_ok());
    }
}
