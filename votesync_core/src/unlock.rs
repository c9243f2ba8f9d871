// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unlock tracking.
//!
//! A statement *unlocks* once the playback position reaches its timecode.
//! [`update_unlocks`] recomputes the highest unlocked index from the clock and
//! applies the two automatic pointer transitions that depend on it:
//!
//! - `NoActive → Active(0)` on the first unlock.
//! - `Waiting(i) → Active(i+1)` once statement `i+1` unlocks.
//!
//! The scan breaks on the first statement whose timecode is still in the
//! future, which is only valid because the statement list is sorted.

use crate::statement::Statement;
use crate::vote::ActivePointer;

/// Unlock progress plus the active pointer for one loaded video.
///
/// Invariant: the active index, when present, never exceeds
/// [`unlocked_index`](Self::unlocked_index).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnlockState {
    /// Highest index whose timecode has been reached, `None` before the first
    /// unlock.
    pub unlocked_index: Option<usize>,
    /// Position of the vote pointer.
    pub pointer: ActivePointer,
}

impl UnlockState {
    /// The state right after a video load: nothing unlocked, nothing active.
    pub const INITIAL: Self = Self {
        unlocked_index: None,
        pointer: ActivePointer::NoActive,
    };

    /// Index of the statement the pointer rests on (active or waiting).
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.pointer.index()
    }

    /// Number of unlocked statements.
    #[must_use]
    pub const fn unlocked_count(&self) -> usize {
        match self.unlocked_index {
            Some(i) => i + 1,
            None => 0,
        }
    }

    /// Whether statement `index` has unlocked.
    #[must_use]
    pub const fn is_unlocked(&self, index: usize) -> bool {
        match self.unlocked_index {
            Some(i) => index <= i,
            None => false,
        }
    }
}

/// Why the pointer moved during an unlock update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutoTransition {
    /// The first unlock activated index 0.
    FirstUnlock,
    /// A waiting pointer advanced because the next statement unlocked.
    DeferredAdvance,
}

/// Result of an [`update_unlocks`] call that changed something.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockChange {
    /// Unlocked index before the update.
    pub previous: Option<usize>,
    /// Unlocked index after the update.
    pub unlocked_index: usize,
    /// Pointer before the update.
    pub pointer_before: ActivePointer,
    /// Pointer transition applied alongside the unlock, if any.
    pub transition: Option<AutoTransition>,
}

impl UnlockChange {
    /// Indices that unlocked in this update.
    #[must_use]
    pub fn newly_unlocked(&self) -> core::ops::RangeInclusive<usize> {
        let start = self.previous.map_or(0, |p| p + 1);
        start..=self.unlocked_index
    }
}

/// Returns the index of the last statement with `timecode <= current_time`.
#[must_use]
pub fn newest_unlocked(statements: &[Statement], current_time: f64) -> Option<usize> {
    let mut newest = None;
    for (i, s) in statements.iter().enumerate() {
        if s.timecode <= current_time {
            newest = Some(i);
        } else {
            break;
        }
    }
    newest
}

/// Advances `state` to reflect `current_time`.
///
/// Returns `None`, leaving `state` untouched, when no new timecode boundary
/// was crossed; calling twice with the same time therefore fires transitions
/// at most once. The unlocked index never moves backwards: seeking back does
/// not re-lock statements.
pub fn update_unlocks(
    statements: &[Statement],
    current_time: f64,
    state: &mut UnlockState,
) -> Option<UnlockChange> {
    let newest = newest_unlocked(statements, current_time)?;
    if state.unlocked_index.is_some_and(|u| newest <= u) {
        return None;
    }

    let previous = state.unlocked_index;
    let pointer_before = state.pointer;
    state.unlocked_index = Some(newest);

    let transition = match state.pointer {
        ActivePointer::NoActive => {
            state.pointer = ActivePointer::Active(0);
            Some(AutoTransition::FirstUnlock)
        }
        ActivePointer::Waiting(i) if i < newest => {
            state.pointer = ActivePointer::Active(i + 1);
            Some(AutoTransition::DeferredAdvance)
        }
        ActivePointer::Active(_) | ActivePointer::Waiting(_) => None,
    };

    Some(UnlockChange {
        previous,
        unlocked_index: newest,
        pointer_before,
        transition,
    })
}

/// Shifts indices after a statement was inserted at `inserted` so they keep
/// referring to the same statements.
///
/// An insertion at or before the unlocked frontier lands in the past (the
/// store inserts after equal timecodes), so the frontier grows by one. An
/// insertion at or before the pointer is skipped by it. An insertion right
/// after the frontier may also be in the past; run [`update_unlocks`] with the
/// current position afterwards to admit it.
pub fn shift_for_insert(state: &mut UnlockState, inserted: usize) {
    if let Some(u) = state.unlocked_index {
        if inserted <= u {
            state.unlocked_index = Some(u + 1);
        }
    }
    state.pointer = match state.pointer {
        ActivePointer::Active(i) if inserted <= i => ActivePointer::Active(i + 1),
        ActivePointer::Waiting(i) if inserted <= i => ActivePointer::Waiting(i + 1),
        other => other,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::StatementId;
    use alloc::vec::Vec;

    fn statements(times: &[f64]) -> Vec<Statement> {
        times
            .iter()
            .zip(1..)
            .map(|(&t, id)| Statement::new(StatementId(id), t, "s"))
            .collect()
    }

    #[test]
    fn nothing_unlocked_before_first_timecode() {
        let list = statements(&[5.0, 10.0]);
        let mut state = UnlockState::INITIAL;
        assert!(update_unlocks(&list, 4.9, &mut state).is_none());
        assert_eq!(state, UnlockState::INITIAL);
    }

    #[test]
    fn first_unlock_auto_activates() {
        let list = statements(&[0.0, 5.0]);
        let mut state = UnlockState::INITIAL;
        let change = update_unlocks(&list, 0.0, &mut state).expect("boundary crossed");
        assert_eq!(change.transition, Some(AutoTransition::FirstUnlock));
        assert_eq!(state.pointer, ActivePointer::Active(0));
        assert_eq!(state.unlocked_index, Some(0));
    }

    #[test]
    fn repeated_time_is_idempotent() {
        let list = statements(&[0.0, 5.0, 9.0]);
        let mut state = UnlockState::INITIAL;
        assert!(update_unlocks(&list, 6.0, &mut state).is_some());
        let snapshot = state;
        assert!(update_unlocks(&list, 6.0, &mut state).is_none());
        assert!(update_unlocks(&list, 6.5, &mut state).is_none());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn multiple_unlocks_in_one_poll() {
        let list = statements(&[1.0, 2.0, 3.0, 30.0]);
        let mut state = UnlockState::INITIAL;
        let change = update_unlocks(&list, 3.5, &mut state).unwrap();
        assert_eq!(change.newly_unlocked(), 0..=2);
        assert_eq!(state.unlocked_count(), 3);
        assert!(state.is_unlocked(2));
        assert!(!state.is_unlocked(3));
    }

    #[test]
    fn waiting_pointer_advances_on_next_unlock() {
        let list = statements(&[0.0, 5.0]);
        let mut state = UnlockState {
            unlocked_index: Some(0),
            pointer: ActivePointer::Waiting(0),
        };
        let change = update_unlocks(&list, 6.0, &mut state).unwrap();
        assert_eq!(change.transition, Some(AutoTransition::DeferredAdvance));
        assert_eq!(state.pointer, ActivePointer::Active(1));
    }

    #[test]
    fn seeking_back_never_relocks() {
        let list = statements(&[0.0, 5.0, 9.0]);
        let mut state = UnlockState::INITIAL;
        let _ = update_unlocks(&list, 9.0, &mut state);
        assert!(update_unlocks(&list, 1.0, &mut state).is_none());
        assert_eq!(state.unlocked_index, Some(2));
    }

    #[test]
    fn unlocked_index_is_monotone_and_bounded() {
        let list = statements(&[0.5, 0.5, 2.0, 3.25, 7.0, 7.0, 11.0]);
        let mut state = UnlockState::INITIAL;
        let mut last = None;
        let mut t = 0.0;
        while t < 12.0 {
            let _ = update_unlocks(&list, t, &mut state);
            let qualifying = list.iter().filter(|s| s.timecode <= t).count();
            assert!(state.unlocked_count() <= qualifying, "t={t}");
            assert!(state.unlocked_index >= last, "t={t}");
            if let Some(a) = state.active_index() {
                assert!(Some(a) <= state.unlocked_index, "pointer ahead of frontier");
            }
            last = state.unlocked_index;
            t += 0.25;
        }
    }

    #[test]
    fn insert_before_pointer_shifts_indices() {
        let mut state = UnlockState {
            unlocked_index: Some(3),
            pointer: ActivePointer::Active(2),
        };
        shift_for_insert(&mut state, 1);
        assert_eq!(state.unlocked_index, Some(4));
        assert_eq!(state.pointer, ActivePointer::Active(3));

        shift_for_insert(&mut state, 9);
        assert_eq!(state.unlocked_index, Some(4), "future insert leaves frontier");
        assert_eq!(state.pointer, ActivePointer::Active(3));
    }

    #[test]
    fn insert_past_frontier_releases_waiting_pointer_on_rescan() {
        let mut list = statements(&[0.0, 5.0, 50.0]);
        let mut state = UnlockState {
            unlocked_index: Some(1),
            pointer: ActivePointer::Waiting(1),
        };
        list.insert(2, Statement::new(StatementId(9), 6.0, "late"));
        shift_for_insert(&mut state, 2);
        assert_eq!(state.unlocked_index, Some(1), "not yet known to be past");

        let change = update_unlocks(&list, 7.0, &mut state).unwrap();
        assert_eq!(change.transition, Some(AutoTransition::DeferredAdvance));
        assert_eq!(state.unlocked_index, Some(2));
        assert_eq!(state.pointer, ActivePointer::Active(2));
    }
}
