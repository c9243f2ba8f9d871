// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session: sole owner of all per-video state.
//!
//! A [`Session`] holds the statement store, unlock state, synthetic events and
//! replay, and the vote choreography for one loaded video. Every mutation goes
//! through one of its operations:
//!
//! | Operation                                      | Driven by                  |
//! |------------------------------------------------|----------------------------|
//! | [`load_video`](Session::load_video)            | user picks a video         |
//! | [`complete_load`](Session::complete_load)      | statement fetch resolves   |
//! | [`tick`](Session::tick)                        | poll loop                  |
//! | [`cast_vote`](Session::cast_vote)              | user votes                 |
//! | [`append_statement`](Session::append_statement)| user adds a statement      |
//! | [`advance_transition`](Session::advance_transition) | redraw loop           |
//!
//! # Generations
//!
//! Each [`load_video`](Session::load_video) bumps a generation counter, resets
//! all state and returns a [`LoadTicket`]. Data for the load is applied with
//! [`complete_load`](Session::complete_load), which rejects tickets from any
//! other generation. Poll ticks from an older generation are ignored. This is
//! how loading a new video cancels everything that belonged to the previous
//! one.
//!
//! # Change reporting
//!
//! Operations mark statements on [`dirty`](crate::dirty) channels by id, so
//! an insert between two drains never re-targets a pending mark;
//! [`take_changes`](Session::take_changes) drains them.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use understory_dirty::Channel;

use crate::config::SessionConfig;
use crate::dirty::{self, ChangeTracker};
use crate::poll::PollTick;
use crate::redact::{self, PreviewLine};
use crate::statement::{Statement, StatementId, StatementStore};
use crate::synth::{self, SyntheticVoteEvent, VoteReplay};
use crate::time::Duration;
use crate::timeline::{self, DrawItem, TimelineInput, TimelineLayout};
use crate::trace::{
    ChoreographyEvent, LoadEvent, LoadOutcome, PointerCause, PointerEvent, PollTickEvent,
    SyntheticBatchEvent, Tracer, UnlockEvent, VoteEvent, VoteRejectedEvent,
};
use crate::transition::{Choreographer, PhaseChange};
use crate::unlock::{self, AutoTransition, UnlockChange, UnlockState};
use crate::vote::{self, ActivePointer, VoteError, VoteOutcome, VoteTransition, VoteValue};

/// Identifier of a video, as extracted from its URL.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VideoId(String);

impl VideoId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({:?})", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one load request. Returned by
/// [`load_video`](Session::load_video) and required by
/// [`complete_load`](Session::complete_load).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
    video_id: VideoId,
}

impl LoadTicket {
    /// Generation the ticket belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Video being loaded.
    #[must_use]
    pub const fn video_id(&self) -> &VideoId {
        &self.video_id
    }
}

/// Why load data was not applied. State is untouched in both cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Another video was loaded after this ticket was issued.
    #[error("stale load for generation {ticket}; current generation is {current}")]
    Stale {
        /// The ticket's generation.
        ticket: u64,
        /// The session's generation.
        current: u64,
    },
    /// Data for this ticket was already applied.
    #[error("load for generation {generation} already completed")]
    AlreadyCompleted {
        /// The ticket's generation.
        generation: u64,
    },
}

/// Result of a successful [`complete_load`](Session::complete_load).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    /// Statements applied.
    pub statement_count: usize,
    /// Synthetic events generated.
    pub synthetic_events: usize,
    /// Whether the data was unavailable and an empty set was applied.
    pub degraded: bool,
}

/// What one [`tick`](Session::tick) changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Playback position read for this tick.
    pub media_time: Option<f64>,
    /// Unlock progress, if a timecode boundary was crossed.
    pub unlock: Option<UnlockChange>,
    /// Synthetic events replayed.
    pub synthetic: usize,
}

/// A manually appended statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppendReport {
    /// Assigned id.
    pub statement_id: StatementId,
    /// Insertion index.
    pub index: usize,
    /// Pointer transition caused by the insert, if any.
    pub transition: Option<AutoTransition>,
}

/// Statements that changed since the last
/// [`take_changes`](Session::take_changes), per category, in timecode order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionChanges {
    /// Statements that unlocked.
    pub unlocked: Vec<StatementId>,
    /// Statements the pointer entered or left.
    pub pointer: Vec<StatementId>,
    /// Statements whose synthetic tally changed.
    pub tallies: Vec<StatementId>,
    /// Statements added or moved by a load or append.
    pub statements: Vec<StatementId>,
}

impl SessionChanges {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
            && self.pointer.is_empty()
            && self.tallies.is_empty()
            && self.statements.is_empty()
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// All mutable state for one loaded video.
///
/// `R` is the random source for synthetic votes; [`Session::new`] seeds a
/// [`SmallRng`] from [`SessionConfig::seed`].
#[derive(Debug)]
pub struct Session<R = SmallRng> {
    config: SessionConfig,
    generation: u64,
    video: Option<VideoId>,
    completed: bool,
    store: StatementStore,
    unlock: UnlockState,
    events: Vec<SyntheticVoteEvent>,
    replay: VoteReplay,
    choreographer: Choreographer,
    last_media_time: Option<f64>,
    changes: ChangeTracker,
    rng: R,
}

impl Session<SmallRng> {
    /// Creates an idle session with a seeded [`SmallRng`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> Session<R> {
    /// Creates an idle session drawing synthetic votes from `rng`.
    pub fn with_rng(config: SessionConfig, rng: R) -> Self {
        Self {
            config,
            generation: 0,
            video: None,
            completed: false,
            store: StatementStore::new(),
            unlock: UnlockState::INITIAL,
            events: Vec::new(),
            replay: VoteReplay::new(config.flash_window),
            choreographer: Choreographer::new(config.choreography),
            last_media_time: None,
            changes: ChangeTracker::new(),
            rng,
        }
    }

    // -- load ------------------------------------------------------------

    /// Starts loading a new video.
    ///
    /// Bumps the generation and resets every piece of per-video state.
    /// Pending loads and poll ticks from earlier generations become stale.
    pub fn load_video(&mut self, video_id: VideoId, tracer: &mut Tracer<'_>) -> LoadTicket {
        self.generation += 1;
        self.video = Some(video_id.clone());
        self.completed = false;
        self.store.clear();
        self.unlock = UnlockState::INITIAL;
        self.events.clear();
        self.replay.clear();
        self.choreographer.clear();
        self.last_media_time = None;
        self.changes = ChangeTracker::new();

        tracer.load(&LoadEvent {
            generation: self.generation,
            ticket_generation: self.generation,
            outcome: LoadOutcome::Started,
            statement_count: 0,
        });
        LoadTicket {
            generation: self.generation,
            video_id,
        }
    }

    /// Applies the statement data for `ticket`.
    ///
    /// `None` means the data could not be fetched or parsed; an empty set is
    /// applied and the load reported as degraded. Synthetic events are
    /// generated here, once per load.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        statements: Option<Vec<Statement>>,
        tracer: &mut Tracer<'_>,
    ) -> Result<LoadReport, LoadError> {
        if ticket.generation != self.generation {
            tracer.load(&LoadEvent {
                generation: self.generation,
                ticket_generation: ticket.generation,
                outcome: LoadOutcome::Stale,
                statement_count: 0,
            });
            return Err(LoadError::Stale {
                ticket: ticket.generation,
                current: self.generation,
            });
        }
        if self.completed {
            return Err(LoadError::AlreadyCompleted {
                generation: ticket.generation,
            });
        }

        let degraded = statements.is_none();
        self.store.replace(statements.unwrap_or_default());
        self.events = synth::generate(
            self.store.as_slice(),
            self.config.participants,
            &self.config.delay,
            &mut self.rng,
        );
        self.completed = true;
        for s in self.store.as_slice() {
            self.changes.mark(s.statement_id, dirty::STATEMENTS);
        }

        tracer.load(&LoadEvent {
            generation: self.generation,
            ticket_generation: ticket.generation,
            outcome: if degraded {
                LoadOutcome::Degraded
            } else {
                LoadOutcome::Applied
            },
            statement_count: count_u32(self.store.len()),
        });
        Ok(LoadReport {
            statement_count: self.store.len(),
            synthetic_events: self.events.len(),
            degraded,
        })
    }

    /// Adds a statement at `timecode` with the next free id.
    ///
    /// The list stays sorted and the unlock state keeps pointing at the same
    /// statements. A statement placed at or before the last polled position
    /// unlocks immediately. The statement gets its own synthetic votes.
    pub fn append_statement(
        &mut self,
        timecode: f64,
        text: impl Into<String>,
        tracer: &mut Tracer<'_>,
    ) -> AppendReport {
        let (statement_id, index) = self.store.append(timecode, text);
        let before = self.unlock.pointer;
        unlock::shift_for_insert(&mut self.unlock, index);

        if let Some(s) = self.store.get(index) {
            let extra = synth::generate_for_statement(
                s,
                self.config.participants,
                &self.config.delay,
                &mut self.rng,
            );
            synth::merge_events(&mut self.events, extra);
        }

        for s in &self.store.as_slice()[index..] {
            self.changes.mark(s.statement_id, dirty::STATEMENTS);
        }
        // Landed inside the unlocked range; the rescan below only sees later
        // statements.
        if self.unlock.is_unlocked(index) {
            self.changes.mark(statement_id, dirty::UNLOCK);
        }
        if self.unlock.pointer != before {
            self.mark_pointer(before, self.unlock.pointer);
            tracer.pointer(&PointerEvent {
                generation: self.generation,
                media_time: self.last_media_time.unwrap_or(0.0),
                before,
                after: self.unlock.pointer,
                cause: PointerCause::Insert,
            });
        }
        let transition = self
            .last_media_time
            .and_then(|t| self.apply_unlocks(t, tracer))
            .and_then(|c| c.transition);

        AppendReport {
            statement_id,
            index,
            transition,
        }
    }

    // -- poll ------------------------------------------------------------

    /// Processes one poll.
    ///
    /// `media_time` is the clock reading taken for this tick (`None` while the
    /// player is not ready). Ticks from another generation are ignored.
    pub fn tick(
        &mut self,
        tick: &PollTick,
        media_time: Option<f64>,
        tracer: &mut Tracer<'_>,
    ) -> TickReport {
        if tick.generation != self.generation {
            return TickReport::default();
        }
        tracer.poll_tick(&PollTickEvent::new(tick, media_time));

        let Some(t) = media_time else {
            return TickReport::default();
        };
        self.last_media_time = Some(t);

        let change = self.apply_unlocks(t, tracer);

        let tracker = &mut self.changes;
        let synthetic = self.replay.process_each(&self.events, t, |e| {
            tracker.mark(e.statement_id, dirty::TALLY);
        });
        if synthetic > 0 {
            tracer.synthetic_batch(&SyntheticBatchEvent {
                generation: self.generation,
                media_time: t,
                processed: count_u32(synthetic),
                total_processed: self.replay.processed_count() as u64,
            });
        }

        TickReport {
            media_time: Some(t),
            unlock: change,
            synthetic,
        }
    }

    // -- votes -----------------------------------------------------------

    /// Records a vote on the statement under the pointer.
    ///
    /// `current_time` is the playback position at vote time. Rejected votes
    /// change nothing.
    pub fn cast_vote(
        &mut self,
        value: VoteValue,
        current_time: f64,
        tracer: &mut Tracer<'_>,
    ) -> Result<VoteOutcome, VoteError> {
        let target = match self.unlock.pointer {
            ActivePointer::NoActive if self.unlock.unlocked_index.is_some() => Some(0),
            p => p.index(),
        };
        if let Some(s) = target.and_then(|i| self.store.get(i)) {
            if self.choreographer.is_in_flight(s.statement_id) {
                let error = VoteError::TransitionInFlight {
                    statement_id: s.statement_id,
                };
                tracer.vote_rejected(&VoteRejectedEvent {
                    generation: self.generation,
                    media_time: Some(current_time),
                    error,
                });
                return Err(error);
            }
        }

        let before = self.unlock.pointer;
        let outcome =
            match vote::cast_vote(self.store.as_slice(), &mut self.unlock, value, current_time) {
                Ok(o) => o,
                Err(error) => {
                    tracer.vote_rejected(&VoteRejectedEvent {
                        generation: self.generation,
                        media_time: Some(current_time),
                        error,
                    });
                    return Err(error);
                }
            };

        if outcome.lazily_activated {
            tracer.pointer(&PointerEvent {
                generation: self.generation,
                media_time: current_time,
                before,
                after: outcome.pointer_before,
                cause: PointerCause::LazyActivation,
            });
        }
        tracer.vote(&VoteEvent {
            generation: self.generation,
            vote: outcome.vote,
            revised: matches!(outcome.transition, VoteTransition::Revised(_)),
        });
        if self.unlock.pointer != outcome.pointer_before {
            tracer.pointer(&PointerEvent {
                generation: self.generation,
                media_time: current_time,
                before: outcome.pointer_before,
                after: self.unlock.pointer,
                cause: PointerCause::Vote,
            });
        }
        if self.unlock.pointer != before {
            self.mark_pointer(before, self.unlock.pointer);
        }

        if let Some(change) = self
            .choreographer
            .begin(outcome.vote.statement_id, outcome.vote.vote)
        {
            self.trace_phase(change, tracer);
        }
        Ok(outcome)
    }

    /// Advances vote choreography by `dt` of host time.
    pub fn advance_transition(
        &mut self,
        dt: Duration,
        tracer: &mut Tracer<'_>,
    ) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        self.choreographer.advance(dt, &mut changes);
        for &c in &changes {
            self.trace_phase(c, tracer);
        }
        changes
    }

    // -- presentation ----------------------------------------------------

    /// Renders the timeline at `current_time` (usually an interpolated
    /// estimate between polls).
    #[must_use]
    pub fn timeline(&self, current_time: f64, layout: &TimelineLayout) -> Vec<DrawItem> {
        timeline::render(
            &TimelineInput {
                current_time,
                statements: self.store.as_slice(),
                state: &self.unlock,
                replay: &self.replay,
            },
            layout,
        )
    }

    /// Redacted previews of the next `count` statements after the active one.
    #[must_use]
    pub fn preview(&self, count: usize) -> Vec<PreviewLine> {
        redact::preview(self.store.as_slice(), &self.unlock, count)
    }

    /// Statement under the pointer.
    #[must_use]
    pub fn active_statement(&self) -> Option<&Statement> {
        self.unlock.active_index().and_then(|i| self.store.get(i))
    }

    /// Drains every dirty channel.
    pub fn take_changes(&mut self) -> SessionChanges {
        SessionChanges {
            unlocked: self.drain(dirty::UNLOCK),
            pointer: self.drain(dirty::POINTER),
            tallies: self.drain(dirty::TALLY),
            statements: self.drain(dirty::STATEMENTS),
        }
    }

    // -- accessors -------------------------------------------------------

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current load generation (0 before the first load).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Video being shown.
    #[must_use]
    pub const fn video(&self) -> Option<&VideoId> {
        self.video.as_ref()
    }

    /// Whether data for the current generation has been applied.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.completed
    }

    /// Statements in timecode order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        self.store.as_slice()
    }

    /// Unlock progress and pointer.
    #[must_use]
    pub const fn unlock_state(&self) -> &UnlockState {
        &self.unlock
    }

    /// Synthetic events, sorted by timecode.
    #[must_use]
    pub fn synthetic_events(&self) -> &[SyntheticVoteEvent] {
        &self.events
    }

    /// Synthetic vote replay.
    #[must_use]
    pub const fn replay(&self) -> &VoteReplay {
        &self.replay
    }

    /// Vote choreography.
    #[must_use]
    pub const fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    /// Playback position read at the most recent poll.
    #[must_use]
    pub const fn last_media_time(&self) -> Option<f64> {
        self.last_media_time
    }

    // -- helpers ---------------------------------------------------------

    fn apply_unlocks(&mut self, t: f64, tracer: &mut Tracer<'_>) -> Option<UnlockChange> {
        let change = unlock::update_unlocks(self.store.as_slice(), t, &mut self.unlock)?;
        for i in change.newly_unlocked() {
            self.mark_index(i, dirty::UNLOCK);
        }
        tracer.unlock(&UnlockEvent {
            generation: self.generation,
            media_time: t,
            previous: change.previous,
            unlocked_index: change.unlocked_index,
        });
        if let Some(auto) = change.transition {
            self.mark_pointer(change.pointer_before, self.unlock.pointer);
            tracer.pointer(&PointerEvent {
                generation: self.generation,
                media_time: t,
                before: change.pointer_before,
                after: self.unlock.pointer,
                cause: match auto {
                    AutoTransition::FirstUnlock => PointerCause::FirstUnlock,
                    AutoTransition::DeferredAdvance => PointerCause::DeferredAdvance,
                },
            });
        }
        Some(change)
    }

    fn mark_pointer(&mut self, before: ActivePointer, after: ActivePointer) {
        for i in [before.index(), after.index()].into_iter().flatten() {
            self.mark_index(i, dirty::POINTER);
        }
    }

    fn mark_index(&mut self, index: usize, channel: Channel) {
        if let Some(s) = self.store.get(index) {
            self.changes.mark(s.statement_id, channel);
        }
    }

    fn drain(&mut self, channel: Channel) -> Vec<StatementId> {
        let mut ids = self.changes.drain(channel);
        let store = &self.store;
        ids.sort_by_key(|&id| store.index_of(id));
        ids
    }

    fn trace_phase(&self, change: PhaseChange, tracer: &mut Tracer<'_>) {
        tracer.choreography(&ChoreographyEvent {
            generation: self.generation,
            statement_id: change.statement_id,
            phase: change.phase,
        });
    }
}
