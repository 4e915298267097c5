//! Normalization of user-supplied remote names and URLs.
//!
//! Command-line values often arrive with stray whitespace or a trailing
//! slash copied from a browser. A remote that already exists is compared
//! against the normalized URL, so `https://host/repo/` and
//! `https://host/repo` are treated as the same remote.

/// Trim surrounding whitespace and every trailing `/`.
pub fn normalize_remote_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Trim surrounding whitespace from a remote name.
pub fn normalize_remote_name(name: &str) -> String {
    name.trim().to_string()
}

/// Whether two remote URLs refer to the same location after normalization.
pub fn same_remote_url(a: &str, b: &str) -> bool {
    normalize_remote_url(a) == normalize_remote_url(b)
}
