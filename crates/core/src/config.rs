//! Optional TOML configuration for mergecheck.
//!
//! Every field can also be given on the command line, which takes
//! precedence. Secrets (the fetch token) are never stored in the file: the
//! `token_env` field names an environment variable that is resolved at
//! runtime via [`MergeCheckConfig::resolve_env_vars`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::git::remote_url::{normalize_remote_name, normalize_remote_url};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeCheckConfig {
    /// Repository to analyse.
    #[serde(default)]
    pub repo: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `mergecheck_core=debug`.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Report settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Remote to add and fetch before analysis.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Report format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `CONFLICT (...)` lines and a summary, like `git merge` prints.
    #[default]
    Text,
    /// The full report as a JSON document.
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// List every conflict, not only the total.
    #[serde(default)]
    pub print_conflicts: bool,

    /// Report format.
    #[serde(default)]
    pub format: ReportFormat,
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

/// A remote to add (if missing) and fetch before analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote name, e.g. `upstream`.
    pub name: String,

    /// Remote URL.
    pub url: String,

    /// Environment variable holding an access token for the fetch.
    #[serde(default)]
    pub token_env: Option<String>,

    /// Resolved token (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub token: Option<String>,
}

impl RemoteConfig {
    /// Build a remote from command-line values, normalizing both.
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: normalize_remote_name(name),
            url: normalize_remote_url(url),
            token_env: None,
            token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl MergeCheckConfig {
    /// Load configuration from a TOML file on disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: MergeCheckConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(remote) = config.remote.as_mut() {
            remote.name = normalize_remote_name(&remote.name);
            remote.url = normalize_remote_url(&remote.url);
        }

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve the `token_env` reference of the remote, if any.
    ///
    /// A missing variable logs a warning and leaves the token unset; the
    /// fetch is then attempted without credentials.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(remote) = self.remote.as_mut() {
            if let Some(ref env_name) = remote.token_env {
                remote.token = resolve_optional_env(env_name, "remote.token_env");
            }
        }
        Ok(())
    }

    /// Validate that all present fields are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            if remote.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "remote.name".into(),
                    detail: "remote name must not be empty".into(),
                });
            }
            if remote.url.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "remote.url".into(),
                    detail: "remote url must not be empty".into(),
                });
            }
        }
        if let Some(repo) = &self.repo {
            if repo.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "repo".into(),
                    detail: "repository path must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }
}

/// Try to read an environment variable by name. Returns `Some(value)` on
/// success; logs a warning and returns `None` if the variable is unset.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
repo = "/srv/checkout"
log_level = "debug"

[output]
print_conflicts = true
format = "json"

[remote]
name = " upstream "
url = "https://example.com/project.git/"
token_env = "MERGECHECK_TEST_TOKEN"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: MergeCheckConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.repo, Some(PathBuf::from("/srv/checkout")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.output.print_conflicts);
        assert_eq!(config.output.format, ReportFormat::Json);
        assert_eq!(
            config.remote.as_ref().unwrap().token_env.as_deref(),
            Some("MERGECHECK_TEST_TOKEN")
        );
    }

    #[test]
    fn test_load_from_file_normalizes_remote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mergecheck.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = MergeCheckConfig::load_from_file(&path).expect("load_from_file failed");
        let remote = config.remote.unwrap();
        assert_eq!(remote.name, "upstream");
        assert_eq!(remote.url, "https://example.com/project.git");
    }

    #[test]
    fn test_file_not_found() {
        let result = MergeCheckConfig::load_from_file("/nonexistent/mergecheck.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "repo = [unterminated").unwrap();
        assert!(matches!(
            MergeCheckConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config: MergeCheckConfig = toml::from_str("").unwrap();
        assert!(config.repo.is_none());
        assert!(config.remote.is_none());
        assert!(!config.output.print_conflicts);
        assert_eq!(config.output.format, ReportFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_remote_url() {
        let mut config: MergeCheckConfig = toml::from_str(sample_toml()).unwrap();
        config.remote.as_mut().unwrap().url = String::new();
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "remote.url"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_remote_name() {
        let mut config: MergeCheckConfig = toml::from_str(sample_toml()).unwrap();
        config.remote.as_mut().unwrap().name = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "remote.name"
        ));
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("MERGECHECK_TEST_TOKEN", "s3cret");

        let mut config: MergeCheckConfig = toml::from_str(sample_toml()).unwrap();
        config.resolve_env_vars().unwrap();
        assert_eq!(
            config.remote.as_ref().unwrap().token.as_deref(),
            Some("s3cret")
        );

        std::env::remove_var("MERGECHECK_TEST_TOKEN");
    }

    #[test]
    fn test_missing_env_var_leaves_token_unset() {
        let toml_str = r#"
[remote]
name = "upstream"
url = "https://example.com/p.git"
token_env = "MERGECHECK_TEST_TOKEN_UNSET"
"#;
        let mut config: MergeCheckConfig = toml::from_str(toml_str).unwrap();
        config.resolve_env_vars().unwrap();
        assert!(config.remote.unwrap().token.is_none());
    }

    #[test]
    fn test_remote_from_cli_values() {
        let remote = RemoteConfig::new("  origin2 ", " https://h/r.git// ");
        assert_eq!(remote.name, "origin2");
        assert_eq!(remote.url, "https://h/r.git");
    }
}
