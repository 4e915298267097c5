//! Error types for the mergecheck core library.
//!
//! Each subsystem has its own error type derived with `thiserror`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Placeholder used when libgit2 reports a failure without a message.
const UNKNOWN_ENGINE_ERROR: &str = "unknown error";

/// Errors from repository, revision, merge and rebase operations.
///
/// Every variant is fatal for the simulation in progress. The expected
/// "no more conflicts" / "no more rebase operations" conditions are never
/// surfaced as errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist or is not a git repo.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// Neither a reference lookup nor an object-id parse succeeded.
    #[error("cannot resolve revision '{revision}' as a reference or commit id: {detail}")]
    RevisionNotFound { revision: String, detail: String },

    /// A libgit2 call failed while performing `action`.
    #[error("{action} failed: {detail}")]
    Engine {
        action: &'static str,
        detail: String,
        #[source]
        source: git2::Error,
    },

    /// A remote with the requested name already points somewhere else.
    #[error(
        "remote '{name}' already exists with the url '{existing}', which differs from \
         the requested '{requested}'; please use a different name"
    )]
    RemoteUrlMismatch {
        name: String,
        existing: String,
        requested: String,
    },
}

impl GitError {
    /// Build a mapper that wraps a `git2::Error` with the action being
    /// attempted, for use with `map_err`.
    pub fn engine(action: &'static str) -> impl FnOnce(git2::Error) -> GitError {
        move |source| GitError::Engine {
            action,
            detail: engine_message(&source),
            source,
        }
    }
}

/// The message libgit2 attached to `err`, or a placeholder when it is empty.
pub fn engine_message(err: &git2::Error) -> String {
    let msg = err.message().trim();
    if msg.is_empty() {
        UNKNOWN_ENGINE_ERROR.to_string()
    } else {
        msg.to_string()
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = GitError::RepositoryNotFound("/tmp/repo".into());
        assert_eq!(err.to_string(), "git repository not found at '/tmp/repo'");

        let err = GitError::RevisionNotFound {
            revision: "nope".into(),
            detail: "reference 'refs/heads/nope' not found".into(),
        };
        assert!(err.to_string().starts_with("cannot resolve revision 'nope'"));

        let err = GitError::RemoteUrlMismatch {
            name: "upstream".into(),
            existing: "https://a.example/x.git".into(),
            requested: "https://b.example/x.git".into(),
        };
        assert!(err.to_string().contains("https://a.example/x.git"));

        let err = ConfigError::InvalidValue {
            field: "remote.url".into(),
            detail: "must not be empty".into(),
        };
        assert!(err.to_string().contains("remote.url"));
    }

    #[test]
    fn test_engine_error_keeps_action_and_message() {
        let source = git2::Error::from_str("object not found");
        let err = GitError::engine("merging commits")(source);
        assert_eq!(err.to_string(), "merging commits failed: object not found");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_engine_message_placeholder() {
        let source = git2::Error::from_str("");
        assert_eq!(engine_message(&source), "unknown error");
    }
}
