//! mergecheck core library.
//!
//! Answers "would this merge or rebase apply cleanly?" without touching
//! the working tree or any reference: revisions are resolved to commits,
//! libgit2 performs the integration in memory, and every unresolved index
//! entry is classified the way `git merge` would report it.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod git;
pub mod revision;
pub mod simulate;

// Re-exports for convenience.
pub use config::MergeCheckConfig;
pub use conflict::{ConflictEntry, ConflictKind};
pub use git::GitClient;
pub use revision::{resolve, ResolvedCommit};
pub use simulate::{simulate_merge, simulate_rebase, SimulationReport};
