//! Presence-based conflict classification.
//!
//! The classifier never inspects file content: which stages of the index
//! are populated is enough to tell a content conflict from an add/add or a
//! modify/delete, since libgit2 has already done the byte-level merge.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One side of a merge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ours,
    Theirs,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
        }
    }
}

/// Categorisation of an unresolved path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "modified")]
pub enum ConflictKind {
    /// One side deleted the path, the other (carried here) modified it.
    ModifyDelete(Side),
    /// Both sides added the path with no common ancestor.
    AddAdd,
    /// Both sides changed a path that exists in the common ancestor.
    Content,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModifyDelete(_) => write!(f, "modify/delete"),
            Self::AddAdd => write!(f, "add/add"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// A single populated stage of a conflicted index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// Repository-relative path of the entry.
    pub path: String,
}

impl StagedEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn from_index_entry(entry: &git2::IndexEntry) -> Self {
        Self {
            path: String::from_utf8_lossy(&entry.path).into_owned(),
        }
    }
}

/// An unresolved path: the ancestor, ours and theirs stages, any of which
/// may be missing.
///
/// At least one of `ours` / `theirs` is always present; the constructors
/// refuse to build an entry otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    ancestor: Option<StagedEntry>,
    ours: Option<StagedEntry>,
    theirs: Option<StagedEntry>,
}

impl ConflictEntry {
    /// Build an entry from its three stages. Returns `None` when neither
    /// `ours` nor `theirs` is present.
    pub fn new(
        ancestor: Option<StagedEntry>,
        ours: Option<StagedEntry>,
        theirs: Option<StagedEntry>,
    ) -> Option<Self> {
        if ours.is_none() && theirs.is_none() {
            return None;
        }
        Some(Self {
            ancestor,
            ours,
            theirs,
        })
    }

    /// Build an entry from a conflict yielded by `git2::Index::conflicts`.
    pub fn from_index_conflict(conflict: &git2::IndexConflict) -> Option<Self> {
        Self::new(
            conflict.ancestor.as_ref().map(StagedEntry::from_index_entry),
            conflict.our.as_ref().map(StagedEntry::from_index_entry),
            conflict.their.as_ref().map(StagedEntry::from_index_entry),
        )
    }

    pub fn ancestor(&self) -> Option<&StagedEntry> {
        self.ancestor.as_ref()
    }

    pub fn ours(&self) -> Option<&StagedEntry> {
        self.ours.as_ref()
    }

    pub fn theirs(&self) -> Option<&StagedEntry> {
        self.theirs.as_ref()
    }

    /// Decide the conflict kind. A missing `ours` is checked before a
    /// missing `theirs`, and both before a missing `ancestor`.
    pub fn classify(&self) -> ConflictKind {
        match (&self.ours, &self.theirs) {
            (None, _) => ConflictKind::ModifyDelete(Side::Theirs),
            (Some(_), None) => ConflictKind::ModifyDelete(Side::Ours),
            (Some(_), Some(_)) if self.ancestor.is_none() => ConflictKind::AddAdd,
            (Some(_), Some(_)) => ConflictKind::Content,
        }
    }

    /// The path reported for this entry: taken from whichever side still
    /// has data, preferring `ours`.
    pub fn path(&self) -> &str {
        self.ours
            .as_ref()
            .or(self.theirs.as_ref())
            .map(|e| e.path.as_str())
            .unwrap_or_default()
    }

    /// Render the report line, labelling the two sides with `our_label` and
    /// `their_label`.
    pub fn render(&self, our_label: &str, their_label: &str) -> String {
        let kind = self.classify();
        match kind {
            ConflictKind::ModifyDelete(Side::Theirs) => format!(
                "CONFLICT ({}): {} deleted in HEAD and modified in {}.",
                kind,
                self.path(),
                their_label
            ),
            ConflictKind::ModifyDelete(Side::Ours) => format!(
                "CONFLICT ({}): {} deleted in {} and modified in HEAD.",
                kind,
                self.path(),
                our_label
            ),
            ConflictKind::AddAdd | ConflictKind::Content => {
                format!("CONFLICT ({}): Merge conflict in {}", kind, self.path())
            }
        }
    }
}
