//! mergecheck command-line tool.
//!
//! Checks whether a merge of two revisions, or a rebase of one branch onto
//! another, would apply without conflicts. Nothing in the repository's
//! history or working tree is changed; only `--remote-url` adds and fetches
//! a remote before the check.
//!
//! Exits with status 0 when the integration is clean and 1 when conflicts
//! were found or the check could not be carried out.

mod output;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mergecheck_core::config::{MergeCheckConfig, RemoteConfig, ReportFormat};
use mergecheck_core::{GitClient, SimulationReport};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Pre-flight merge and rebase conflict checker.
#[derive(Parser, Debug)]
#[command(
    name = "mergecheck",
    version,
    about = "Check whether a merge or rebase would succeed without conflicts"
)]
struct Cli {
    /// Path to the repository.
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Add a new remote to the repository and fetch it before the check.
    /// (This is not an in-memory operation and changes the repository!)
    #[arg(long, global = true, requires = "remote_name")]
    remote_url: Option<String>,

    /// Name for the new remote (e.g. 'upstream').
    #[arg(long, global = true, requires = "remote_url")]
    remote_name: Option<String>,

    /// List all conflicts.
    #[arg(long, global = true)]
    print_conflicts: bool,

    /// Be verbose.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Report format.
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Path to an optional TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Join two development histories together.
    Merge {
        /// Commit/ref that reflects the destination tree.
        #[arg(long)]
        our: String,

        /// Commit/ref to merge into the "our" commit.
        #[arg(long)]
        their: String,
    },

    /// Reapply commits on top of another base tip.
    Rebase {
        /// Upstream branch to compare against. Can be any valid commit.
        #[arg(long)]
        upstream: String,

        /// Branch to rebase onto another branch. Can be any valid commit.
        #[arg(long)]
        branch: String,

        /// Starting point for the new commits. Can be any valid commit.
        /// Defaults to <UPSTREAM>.
        #[arg(long)]
        onto: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Effective settings after merging the config file and the command line.
struct Settings {
    repo: PathBuf,
    remote: Option<RemoteConfig>,
    print_conflicts: bool,
    format: ReportFormat,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose, config.log_level.as_deref());

    let outcome = run(cli, config);
    if let Err(e) = &outcome {
        eprintln!("{}", style::error(&format!("Error: {:#}", e)));
    }
    exit_code(&outcome)
}

/// Success only for a check that ran and found no conflicts.
fn exit_code(outcome: &Result<SimulationReport>) -> ExitCode {
    match outcome {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Diagnostics go to stderr. `RUST_LOG` wins over the config file, which
/// wins over `--verbose`.
fn init_tracing(verbose: bool, config_level: Option<&str>) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_level.unwrap_or(default_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli, config: MergeCheckConfig) -> Result<SimulationReport> {
    let settings = resolve_settings(&cli, config)?;
    debug!(repo = %settings.repo.display(), format = %settings.format, "effective settings");

    let client = GitClient::open(&settings.repo).context("failed to open repository")?;

    if let Some(remote) = &settings.remote {
        client
            .add_and_fetch_remote(&remote.name, &remote.url, remote.token.as_deref())
            .with_context(|| format!("failed to add remote '{}'", remote.name))?;
    }

    let report = match &cli.command {
        Commands::Merge { our, their } => client
            .simulate_merge(our.trim(), their.trim())
            .context("merge check failed")?,
        Commands::Rebase {
            upstream,
            branch,
            onto,
        } => client
            .simulate_rebase(upstream.trim(), branch.trim(), onto.as_deref().map(str::trim))
            .context("rebase check failed")?,
    };

    info!(
        operation = %report.operation,
        conflicts = report.total(),
        "check complete"
    );
    output::print_report(&report, settings.format, settings.print_conflicts)?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&str>) -> Result<MergeCheckConfig> {
    let Some(path) = path else {
        return Ok(MergeCheckConfig::default());
    };
    let resolved = expand_tilde(path);
    MergeCheckConfig::load_and_resolve(&resolved).context("failed to load configuration file")
}

/// Combine the command line with the config file; the command line wins.
fn resolve_settings(cli: &Cli, config: MergeCheckConfig) -> Result<Settings> {
    let repo = match cli.repo.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        Some(_) => bail!("--repo must not be empty"),
        None => match config.repo {
            Some(path) => path,
            None => bail!("no repository given: pass --repo or set `repo` in the config file"),
        },
    };

    let remote = match (&cli.remote_name, &cli.remote_url) {
        (Some(name), Some(url)) => {
            let remote = RemoteConfig::new(name, url);
            if remote.name.is_empty() || remote.url.is_empty() {
                bail!("options \"remote-url\" and \"remote-name\" must not be empty");
            }
            Some(remote)
        }
        (None, None) => config.remote,
        _ => bail!("options \"remote-url\" and \"remote-name\" have to be provided together"),
    };

    Ok(Settings {
        repo,
        remote,
        print_conflicts: cli.print_conflicts || config.output.print_conflicts,
        format: cli.format.map(Into::into).unwrap_or(config.output.format),
    })
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
