// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty tracking for session changes.
//!
//! The session marks what changed during each operation on a
//! [`ChangeTracker`], one channel per category of change.
//! [`Session::take_changes`](crate::session::Session::take_changes) drains
//! every channel and reports the result as
//! [`SessionChanges`](crate::session::SessionChanges), so a presentation layer
//! only re-renders what actually moved.
//!
//! Marks are keyed by a per-load slot handed out the first time a statement is
//! marked. Slots never move, so inserting a statement between a mark and the
//! next drain cannot re-target pending marks.
//!
//! All channels are local-only: statements do not depend on each other.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::statement::StatementId;

/// A statement crossed its unlock time.
pub const UNLOCK: Channel = Channel::new(0);

/// The active pointer entered or left a statement.
pub const POINTER: Channel = Channel::new(1);

/// A statement's synthetic tally changed.
pub const TALLY: Channel = Channel::new(2);

/// The statement list changed shape (load, append).
pub const STATEMENTS: Channel = Channel::new(3);

/// Per-statement dirty marks keyed by stable slots.
#[derive(Debug)]
pub struct ChangeTracker {
    dirty: DirtyTracker<u32>,
    slots: BTreeMap<StatementId, u32>,
    ids: Vec<StatementId>,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeTracker {
    /// Creates a tracker with nothing marked.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            slots: BTreeMap::new(),
            ids: Vec::new(),
        }
    }

    /// Marks `id` dirty on `channel`.
    pub fn mark(&mut self, id: StatementId, channel: Channel) {
        let next = u32::try_from(self.ids.len()).unwrap_or(u32::MAX);
        let slot = *self.slots.entry(id).or_insert_with(|| {
            self.ids.push(id);
            next
        });
        self.dirty.mark(slot, channel);
    }

    /// Drains `channel`, returning the marked statements in slot order.
    pub fn drain(&mut self, channel: Channel) -> Vec<StatementId> {
        let ids = &self.ids;
        self.dirty
            .drain(channel)
            .deterministic()
            .run()
            .filter_map(|slot| usize::try_from(slot).ok().and_then(|i| ids.get(i)).copied())
            .collect()
    }
}
