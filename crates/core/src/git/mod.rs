//! Repository access for mergecheck.

pub mod client;
pub mod remote_url;

pub use client::GitClient;
pub use remote_url::{normalize_remote_name, normalize_remote_url};
