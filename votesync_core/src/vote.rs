// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vote records and the active-pointer state machine.
//!
//! ```text
//!             first unlock / lazy on vote
//!   NoActive ─────────────────────────────► Active(0)
//!
//!   Active(i) ──vote, i+1 unlocked──────────► Active(i+1)
//!   Active(i) ──vote, i+1 still locked──────► Waiting(i)
//!   Waiting(i) ─vote───────────────────────► Waiting(i)   (re-emit, no advance)
//!   Waiting(i) ─unlock tracker admits i+1──► Active(i+1)
//! ```
//!
//! [`cast_vote`] handles the vote-driven edges; the unlock-driven ones live in
//! [`unlock`](crate::unlock).

use core::fmt;

use crate::statement::{Statement, StatementId};
use crate::time::floor_secs;
use crate::unlock::UnlockState;

/// A vote value. The discriminants are the wire values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "i8", try_from = "i8"))]
pub enum VoteValue {
    /// Agree (+1).
    Agree,
    /// Disagree (-1).
    Disagree,
    /// Pass (0).
    Pass,
}

impl VoteValue {
    /// All values, in display order.
    pub const ALL: [Self; 3] = [Self::Agree, Self::Disagree, Self::Pass];

    /// The signed wire value.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Agree => 1,
            Self::Disagree => -1,
            Self::Pass => 0,
        }
    }

    /// Short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agree => "agree",
            Self::Disagree => "disagree",
            Self::Pass => "pass",
        }
    }
}

impl From<VoteValue> for i8 {
    fn from(v: VoteValue) -> Self {
        v.as_i8()
    }
}

/// Error for a wire value other than -1, 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("vote value must be -1, 0 or 1, got {0}")]
pub struct InvalidVoteValue(pub i8);

impl TryFrom<i8> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Agree),
            -1 => Ok(Self::Disagree),
            0 => Ok(Self::Pass),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

/// A vote emitted for the active statement.
///
/// Not stored by the engine; the embedding application transports it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Vote {
    /// The vote value.
    pub vote: VoteValue,
    /// Statement voted on.
    pub statement_id: StatementId,
    /// The statement's unlock time, in seconds.
    pub loaded_timecode: f64,
    /// Playback position at vote time, floored to whole seconds.
    pub video_timecode: u64,
}

/// Position of the vote pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivePointer {
    /// Nothing has unlocked yet.
    #[default]
    NoActive,
    /// An unlocked statement awaits a vote.
    Active(usize),
    /// The statement was voted on but its successor has not unlocked yet.
    Waiting(usize),
}

impl ActivePointer {
    /// Index of the statement under the pointer.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::NoActive => None,
            Self::Active(i) | Self::Waiting(i) => Some(i),
        }
    }

    /// Whether the pointer is waiting for the next unlock.
    #[must_use]
    pub const fn is_waiting(self) -> bool {
        matches!(self, Self::Waiting(_))
    }
}

impl fmt::Display for ActivePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActive => f.write_str("none"),
            Self::Active(i) => write!(f, "active({i})"),
            Self::Waiting(i) => write!(f, "waiting({i})"),
        }
    }
}

/// Why a vote was not recorded. No state changes in either case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    /// Nothing has unlocked yet.
    #[error("no active statement")]
    NoActiveStatement,
    /// The statement's vote transition is still animating.
    #[error("transition for statement {statement_id} still in flight")]
    TransitionInFlight {
        /// Statement whose transition is running.
        statement_id: StatementId,
    },
}

/// How the pointer moved as a result of a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteTransition {
    /// `Active(from) → Active(to)`.
    Advanced {
        /// Index voted on.
        from: usize,
        /// Newly active index.
        to: usize,
    },
    /// `Active(i) → Waiting(i)`.
    Held(usize),
    /// `Waiting(i) → Waiting(i)`; the vote replaces the earlier one.
    Revised(usize),
}

impl VoteTransition {
    /// Index of the statement the vote applied to.
    #[must_use]
    pub const fn voted_index(self) -> usize {
        match self {
            Self::Advanced { from, .. } => from,
            Self::Held(i) | Self::Revised(i) => i,
        }
    }
}

/// A successfully recorded vote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteOutcome {
    /// The emitted record.
    pub vote: Vote,
    /// Pointer before the vote (after any lazy activation).
    pub pointer_before: ActivePointer,
    /// Pointer movement.
    pub transition: VoteTransition,
    /// Whether the vote lazily activated the first statement.
    pub lazily_activated: bool,
}

/// Records a vote on the statement under the pointer and moves the pointer.
///
/// `statements` must be the list `state` was computed against.
pub fn cast_vote(
    statements: &[Statement],
    state: &mut UnlockState,
    value: VoteValue,
    current_time: f64,
) -> Result<VoteOutcome, VoteError> {
    let mut lazily_activated = false;
    if state.pointer == ActivePointer::NoActive {
        if state.unlocked_index.is_none() {
            return Err(VoteError::NoActiveStatement);
        }
        state.pointer = ActivePointer::Active(0);
        lazily_activated = true;
    }

    let pointer_before = state.pointer;
    let (index, waiting) = match pointer_before {
        ActivePointer::Active(i) => (i, false),
        ActivePointer::Waiting(i) => (i, true),
        ActivePointer::NoActive => return Err(VoteError::NoActiveStatement),
    };
    let statement = statements
        .get(index)
        .ok_or(VoteError::NoActiveStatement)?;

    let vote = Vote {
        vote: value,
        statement_id: statement.statement_id,
        loaded_timecode: statement.timecode,
        video_timecode: floor_secs(current_time),
    };

    let transition = if waiting {
        VoteTransition::Revised(index)
    } else if state.is_unlocked(index + 1) {
        state.pointer = ActivePointer::Active(index + 1);
        VoteTransition::Advanced {
            from: index,
            to: index + 1,
        }
    } else {
        state.pointer = ActivePointer::Waiting(index);
        VoteTransition::Held(index)
    };

    Ok(VoteOutcome {
        vote,
        pointer_before,
        transition,
        lazily_activated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlock::update_unlocks;
    use alloc::vec;
    use alloc::vec::Vec;

    fn two_statements() -> Vec<Statement> {
        vec![
            Statement::new(StatementId(1), 0.0, "first"),
            Statement::new(StatementId(2), 5.0, "second"),
        ]
    }

    #[test]
    fn vote_then_advance() {
        let list = two_statements();
        let mut state = UnlockState::INITIAL;
        let _ = update_unlocks(&list, 6.0, &mut state);
        assert_eq!(state.active_index(), Some(0));

        let out = cast_vote(&list, &mut state, VoteValue::Agree, 6.0).unwrap();
        assert_eq!(out.transition, VoteTransition::Advanced { from: 0, to: 1 });
        assert_eq!(state.pointer, ActivePointer::Active(1));
        assert_eq!(
            out.vote,
            Vote {
                vote: VoteValue::Agree,
                statement_id: StatementId(1),
                loaded_timecode: 0.0,
                video_timecode: 6,
            }
        );
    }

    #[test]
    fn vote_without_successor_waits_then_auto_advances() {
        let list = two_statements();
        let mut state = UnlockState::INITIAL;
        let _ = update_unlocks(&list, 2.0, &mut state);

        let out = cast_vote(&list, &mut state, VoteValue::Disagree, 2.0).unwrap();
        assert_eq!(out.transition, VoteTransition::Held(0));
        assert_eq!(state.pointer, ActivePointer::Waiting(0));

        let _ = update_unlocks(&list, 6.0, &mut state);
        assert_eq!(state.pointer, ActivePointer::Active(1));
    }

    #[test]
    fn revote_while_waiting_does_not_double_advance() {
        let list = two_statements();
        let mut state = UnlockState::INITIAL;
        let _ = update_unlocks(&list, 2.0, &mut state);
        let _ = cast_vote(&list, &mut state, VoteValue::Agree, 2.0).unwrap();

        let again = cast_vote(&list, &mut state, VoteValue::Pass, 3.4).unwrap();
        assert_eq!(again.transition, VoteTransition::Revised(0));
        assert_eq!(again.vote.statement_id, StatementId(1));
        assert_eq!(again.vote.vote, VoteValue::Pass);
        assert_eq!(again.vote.video_timecode, 3);
        assert_eq!(state.pointer, ActivePointer::Waiting(0));

        let _ = update_unlocks(&list, 5.0, &mut state);
        assert_eq!(state.pointer, ActivePointer::Active(1), "exactly one step");
    }

    #[test]
    fn vote_with_nothing_unlocked_is_rejected() {
        let list = two_statements();
        let mut state = UnlockState::INITIAL;
        let err = cast_vote(&list, &mut state, VoteValue::Agree, 0.0).unwrap_err();
        assert_eq!(err, VoteError::NoActiveStatement);
        assert_eq!(state, UnlockState::INITIAL);
    }

    #[test]
    fn lazy_activation_on_first_vote() {
        let list = two_statements();
        let mut state = UnlockState {
            unlocked_index: Some(1),
            pointer: ActivePointer::NoActive,
        };
        let out = cast_vote(&list, &mut state, VoteValue::Agree, 7.0).unwrap();
        assert!(out.lazily_activated);
        assert_eq!(out.vote.statement_id, StatementId(1));
        assert_eq!(state.pointer, ActivePointer::Active(1));
    }

    #[test]
    fn wire_values() {
        for v in VoteValue::ALL {
            assert_eq!(VoteValue::try_from(v.as_i8()), Ok(v));
        }
        assert_eq!(VoteValue::try_from(2), Err(InvalidVoteValue(2)));
    }
}
