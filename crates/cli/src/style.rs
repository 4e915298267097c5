//! Shared styling utilities for terminal output.
//!
//! `console` drops the colour codes on its own when the stream is not a
//! terminal, so CI logs receive the plain text.

use console::Style;

/// Green text, for the clean-result summary.
pub fn success(msg: &str) -> String {
    Style::new().green().apply_to(msg).to_string()
}

/// Red text with a cross, for fatal errors on stderr.
pub fn error(msg: &str) -> String {
    let style = Style::new().for_stderr().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Yellow text with a warning sign, for non-fatal problems on stderr.
pub fn warn(msg: &str) -> String {
    let style = Style::new().for_stderr().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Bold red text, for the conflicts-found summary.
pub fn failure(msg: &str) -> String {
    Style::new().red().bold().apply_to(msg).to_string()
}
