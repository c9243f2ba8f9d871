// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vote presentation choreography.
//!
//! After a vote the active card flashes in the vote's color, fades, then the
//! list shifts to the next statement. Each transition is a tiny timed state
//! machine `(phase, elapsed)` advanced by clock deltas from the redraw loop.
//!
//! The choreography only describes what the presentation layer should show.
//! It never moves the active pointer; it does gate re-votes, because a vote on
//! a statement whose transition is still running is rejected (see
//! [`Choreographer::is_in_flight`]).

use alloc::vec::Vec;

use crate::statement::StatementId;
use crate::time::Duration;
use crate::vote::VoteValue;

/// A choreography phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The card flashes in the vote color.
    Flash,
    /// The card fades out.
    Fade,
    /// The list slides to the next statement.
    Shift,
}

impl Phase {
    const fn next(self) -> Option<Self> {
        match self {
            Self::Flash => Some(Self::Fade),
            Self::Fade => Some(Self::Shift),
            Self::Shift => None,
        }
    }
}

/// Phase durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoreographyTimings {
    /// Flash phase.
    pub flash: Duration,
    /// Fade phase.
    pub fade: Duration,
    /// Shift phase.
    pub shift: Duration,
}

impl ChoreographyTimings {
    /// 300 ms flash, 300 ms fade, 400 ms shift.
    pub const STANDARD: Self = Self {
        flash: Duration::from_millis(300),
        fade: Duration::from_millis(300),
        shift: Duration::from_millis(400),
    };

    /// All phases complete immediately.
    pub const INSTANT: Self = Self {
        flash: Duration::ZERO,
        fade: Duration::ZERO,
        shift: Duration::ZERO,
    };

    /// Duration of one phase.
    #[must_use]
    pub const fn duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Flash => self.flash,
            Phase::Fade => self.fade,
            Phase::Shift => self.shift,
        }
    }

    /// Sum of all phases.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.flash + self.fade + self.shift
    }
}

impl Default for ChoreographyTimings {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One running transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Statement that was voted on.
    pub statement_id: StatementId,
    /// The vote that started the transition.
    pub vote: VoteValue,
    /// Current phase.
    pub phase: Phase,
    /// Time spent in the current phase.
    pub elapsed: Duration,
}

impl Transition {
    /// Progress through the current phase, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, timings: &ChoreographyTimings) -> f64 {
        let d = timings.duration(self.phase).nanos();
        if d == 0 {
            return 1.0;
        }
        (self.elapsed.nanos() as f64 / d as f64).min(1.0)
    }
}

/// A phase boundary crossed during [`Choreographer::begin`] or
/// [`Choreographer::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    /// Statement whose transition changed phase.
    pub statement_id: StatementId,
    /// The new phase, or `None` once the transition has finished.
    pub phase: Option<Phase>,
}

/// Drives all running transitions.
#[derive(Clone, Debug, Default)]
pub struct Choreographer {
    timings: ChoreographyTimings,
    running: Vec<Transition>,
}

impl Choreographer {
    /// Creates an idle choreographer.
    #[must_use]
    pub const fn new(timings: ChoreographyTimings) -> Self {
        Self {
            timings,
            running: Vec::new(),
        }
    }

    /// Returns the phase durations.
    #[must_use]
    pub const fn timings(&self) -> &ChoreographyTimings {
        &self.timings
    }

    /// Returns whether a transition for `statement_id` is still running.
    #[must_use]
    pub fn is_in_flight(&self, statement_id: StatementId) -> bool {
        self.running.iter().any(|t| t.statement_id == statement_id)
    }

    /// Running transitions, oldest first.
    #[must_use]
    pub fn running(&self) -> &[Transition] {
        &self.running
    }

    /// Starts a transition for a freshly recorded vote.
    ///
    /// A transition already running for the same statement is left alone and
    /// `None` is returned; callers reject such votes before recording them.
    pub fn begin(&mut self, statement_id: StatementId, vote: VoteValue) -> Option<PhaseChange> {
        if self.is_in_flight(statement_id) {
            return None;
        }
        self.running.push(Transition {
            statement_id,
            vote,
            phase: Phase::Flash,
            elapsed: Duration::ZERO,
        });
        Some(PhaseChange {
            statement_id,
            phase: Some(Phase::Flash),
        })
    }

    /// Advances every running transition by `dt`, appending each crossed
    /// phase boundary to `changes`. Finished transitions are dropped.
    pub fn advance(&mut self, dt: Duration, changes: &mut Vec<PhaseChange>) {
        let timings = self.timings;
        self.running.retain_mut(|t| {
            t.elapsed = t.elapsed + dt;
            loop {
                let d = timings.duration(t.phase);
                if t.elapsed < d {
                    return true;
                }
                t.elapsed = t.elapsed.saturating_sub(d);
                match t.phase.next() {
                    Some(next) => {
                        t.phase = next;
                        changes.push(PhaseChange {
                            statement_id: t.statement_id,
                            phase: Some(next),
                        });
                    }
                    None => {
                        changes.push(PhaseChange {
                            statement_id: t.statement_id,
                            phase: None,
                        });
                        return false;
                    }
                }
            }
        });
    }

    /// Drops every running transition.
    pub fn clear(&mut self) {
        self.running.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: StatementId = StatementId(4);

    #[test]
    fn walks_all_phases_then_finishes() {
        let mut c = Choreographer::new(ChoreographyTimings::STANDARD);
        let start = c.begin(ID, VoteValue::Agree).unwrap();
        assert_eq!(start.phase, Some(Phase::Flash));
        assert!(c.is_in_flight(ID));

        let mut changes = Vec::new();
        c.advance(Duration::from_millis(299), &mut changes);
        assert!(changes.is_empty(), "still flashing");

        c.advance(Duration::from_millis(1), &mut changes);
        assert_eq!(changes.last().unwrap().phase, Some(Phase::Fade));

        c.advance(Duration::from_millis(700), &mut changes);
        assert_eq!(
            changes.iter().map(|c| c.phase).collect::<Vec<_>>(),
            [Some(Phase::Fade), Some(Phase::Shift), None]
        );
        assert!(!c.is_in_flight(ID));
    }

    #[test]
    fn large_delta_crosses_several_boundaries() {
        let mut c = Choreographer::new(ChoreographyTimings::STANDARD);
        let _ = c.begin(ID, VoteValue::Pass);
        let mut changes = Vec::new();
        c.advance(Duration::from_millis(650), &mut changes);
        assert_eq!(c.running()[0].phase, Phase::Shift);
        assert_eq!(c.running()[0].elapsed, Duration::from_millis(50));
    }

    #[test]
    fn begin_is_not_reentrant_for_same_statement() {
        let mut c = Choreographer::new(ChoreographyTimings::STANDARD);
        assert!(c.begin(ID, VoteValue::Agree).is_some());
        assert!(c.begin(ID, VoteValue::Disagree).is_none());
        assert_eq!(c.running().len(), 1);
        assert!(c.begin(StatementId(5), VoteValue::Agree).is_some());
    }

    #[test]
    fn instant_timings_finish_on_first_advance() {
        let mut c = Choreographer::new(ChoreographyTimings::INSTANT);
        let _ = c.begin(ID, VoteValue::Agree);
        let mut changes = Vec::new();
        c.advance(Duration::ZERO, &mut changes);
        assert_eq!(changes.len(), 3, "fade, shift, done");
        assert!(c.running().is_empty());
    }

    #[test]
    fn progress_within_phase() {
        let t = Transition {
            statement_id: ID,
            vote: VoteValue::Agree,
            phase: Phase::Shift,
            elapsed: Duration::from_millis(100),
        };
        let p = t.progress(&ChoreographyTimings::STANDARD);
        assert!((p - 0.25).abs() < 1e-9, "got {p}");
    }
}
