// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Statements and the sorted statement store.
//!
//! The store keeps statements sorted ascending by timecode at all times. The
//! unlock scan in [`unlock`](crate::unlock) breaks on the first future
//! statement and is only correct because of that invariant, so every mutation
//! path (bulk replace, manual append) re-establishes it.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// Maximum number of characters shown for a statement.
pub const MAX_DISPLAY_CHARS: usize = 260;

/// Caller-assigned statement identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatementId(pub i64);

impl fmt::Debug for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatementId({})", self.0)
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timestamped textual item presented for voting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Statement {
    /// Unique identity.
    pub statement_id: StatementId,
    /// Playback position, in seconds, at which the statement unlocks.
    pub timecode: f64,
    /// Statement text. May exceed [`MAX_DISPLAY_CHARS`]; see
    /// [`display_text`](Self::display_text).
    pub text: String,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(statement_id: StatementId, timecode: f64, text: impl Into<String>) -> Self {
        Self {
            statement_id,
            timecode,
            text: text.into(),
        }
    }

    /// Returns the text truncated to [`MAX_DISPLAY_CHARS`] characters.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self.text.char_indices().nth(MAX_DISPLAY_CHARS) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }
}

fn by_timecode(a: &Statement, b: &Statement) -> Ordering {
    a.timecode.total_cmp(&b.timecode)
}

/// Ordered statement list for the loaded video.
#[derive(Clone, Debug, Default)]
pub struct StatementStore {
    statements: Vec<Statement>,
}

impl StatementStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Replaces the whole set, sorting by timecode (stable for ties).
    pub fn replace(&mut self, mut statements: Vec<Statement>) {
        statements.sort_by(by_timecode);
        self.statements = statements;
    }

    /// Clears the store.
    pub fn clear(&mut self) {
        self.statements.clear();
    }

    /// Appends a statement with the next free id, inserting it after every
    /// statement whose timecode is less than or equal to `timecode`.
    ///
    /// Returns the assigned id and the insertion index.
    pub fn append(&mut self, timecode: f64, text: impl Into<String>) -> (StatementId, usize) {
        let id = self.next_id();
        let index = self
            .statements
            .partition_point(|s| s.timecode.total_cmp(&timecode) != Ordering::Greater);
        self.statements
            .insert(index, Statement::new(id, timecode, text));
        (id, index)
    }

    /// Returns `max(existing ids) + 1`, or `1` for an empty store.
    #[must_use]
    pub fn next_id(&self) -> StatementId {
        self.statements
            .iter()
            .map(|s| s.statement_id.0)
            .max()
            .map_or(StatementId(1), |max| StatementId(max.saturating_add(1)))
    }

    /// Returns the statements in timecode order.
    #[must_use]
    pub fn as_slice(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the statement at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    /// Returns the index of the statement with the given id.
    #[must_use]
    pub fn index_of(&self, id: StatementId) -> Option<usize> {
        self.statements.iter().position(|s| s.statement_id == id)
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString as _;

    fn s(id: i64, t: f64) -> Statement {
        Statement::new(StatementId(id), t, "x")
    }

    fn timecodes(store: &StatementStore) -> Vec<f64> {
        store.as_slice().iter().map(|s| s.timecode).collect()
    }

    #[test]
    fn replace_sorts_by_timecode() {
        let mut store = StatementStore::new();
        store.replace(alloc::vec![s(1, 9.0), s(2, 1.0), s(3, 4.5)]);
        assert_eq!(timecodes(&store), [1.0, 4.5, 9.0]);
        assert_eq!(store.index_of(StatementId(1)), Some(2));
    }

    #[test]
    fn replace_is_stable_for_ties() {
        let mut store = StatementStore::new();
        store.replace(alloc::vec![s(7, 2.0), s(3, 2.0), s(5, 1.0)]);
        let ids: Vec<i64> = store.as_slice().iter().map(|s| s.statement_id.0).collect();
        assert_eq!(ids, [5, 7, 3]);
    }

    #[test]
    fn append_assigns_next_id_and_keeps_order() {
        let mut store = StatementStore::new();
        store.replace(alloc::vec![s(4, 0.0), s(10, 5.0), s(2, 12.0)]);

        let (id, index) = store.append(5.0, "late arrival");
        assert_eq!(id, StatementId(11));
        assert_eq!(index, 2, "inserted after the existing 5.0 statement");
        assert_eq!(timecodes(&store), [0.0, 5.0, 5.0, 12.0]);
    }

    #[test]
    fn append_to_empty_store_starts_at_one() {
        let mut store = StatementStore::new();
        let (id, index) = store.append(3.0, "first");
        assert_eq!(id, StatementId(1));
        assert_eq!(index, 0);
    }

    #[test]
    fn display_text_truncates_by_characters() {
        let long = "é".repeat(300);
        let st = Statement::new(StatementId(1), 0.0, long);
        assert_eq!(st.display_text().chars().count(), MAX_DISPLAY_CHARS);

        let short = Statement::new(StatementId(2), 0.0, "short".to_string());
        assert_eq!(short.display_text(), "short");
    }
}
