//! Conflict entries and their classification.
//!
//! A trial merge or rebase step leaves unresolved paths in its in-memory
//! index as (ancestor, ours, theirs) stage triples. This module turns each
//! triple into a [`ConflictKind`] and renders the report line a real
//! `git merge` would print for it.

pub mod classifier;

pub use classifier::{ConflictEntry, ConflictKind, Side, StagedEntry};
