// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the session loop.
//!
//! This module provides a [`TraceSink`] trait with one method per session
//! event. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Every event carries the load generation it belongs to, plus the media time
//! at which it happened.

use crate::poll::PollTick;
use crate::statement::StatementId;
use crate::time::HostTime;
use crate::transition::Phase;
use crate::vote::{ActivePointer, Vote, VoteError};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to a load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// A new load was started; all state was reset.
    Started,
    /// Data arrived and was applied.
    Applied,
    /// Data could not be fetched or parsed; an empty set was applied.
    Degraded,
    /// Data arrived for a superseded load and was discarded.
    Stale,
}

/// Why the pointer moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerCause {
    /// The first unlock activated index 0.
    FirstUnlock,
    /// A waiting pointer advanced because its successor unlocked.
    DeferredAdvance,
    /// A vote activated the first statement lazily.
    LazyActivation,
    /// A vote moved the pointer.
    Vote,
    /// A manual insert shifted indices.
    Insert,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every poll the session processes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollTickEvent {
    /// Load generation.
    pub generation: u64,
    /// Poll counter within the generation.
    pub poll_index: u64,
    /// Host time of the poll.
    pub now: HostTime,
    /// Playback position read at the poll, `None` if the clock was not ready.
    pub media_time: Option<f64>,
    /// Intervals skipped since the previous poll.
    pub skipped: u32,
}

impl PollTickEvent {
    /// Builds the event for a poll tick and its clock reading.
    #[must_use]
    pub const fn new(tick: &PollTick, media_time: Option<f64>) -> Self {
        Self {
            generation: tick.generation,
            poll_index: tick.poll_index,
            now: tick.now,
            media_time,
            skipped: tick.skipped,
        }
    }
}

/// Emitted when a load starts, completes, or is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadEvent {
    /// Current session generation.
    pub generation: u64,
    /// Generation of the ticket the event concerns.
    pub ticket_generation: u64,
    /// What happened.
    pub outcome: LoadOutcome,
    /// Number of statements applied (zero unless applied).
    pub statement_count: u32,
}

/// Emitted when the unlocked frontier moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnlockEvent {
    /// Load generation.
    pub generation: u64,
    /// Playback position.
    pub media_time: f64,
    /// Frontier before.
    pub previous: Option<usize>,
    /// Frontier after.
    pub unlocked_index: usize,
}

/// Emitted when the active pointer changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Load generation.
    pub generation: u64,
    /// Playback position.
    pub media_time: f64,
    /// Pointer before.
    pub before: ActivePointer,
    /// Pointer after.
    pub after: ActivePointer,
    /// Why it moved.
    pub cause: PointerCause,
}

/// Emitted for every recorded vote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteEvent {
    /// Load generation.
    pub generation: u64,
    /// The emitted record.
    pub vote: Vote,
    /// Whether the vote replaced an earlier one (pointer was waiting).
    pub revised: bool,
}

/// Emitted when a vote is rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteRejectedEvent {
    /// Load generation.
    pub generation: u64,
    /// Playback position, if known.
    pub media_time: Option<f64>,
    /// Reason.
    pub error: VoteError,
}

/// Emitted when a poll replays synthetic votes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticBatchEvent {
    /// Load generation.
    pub generation: u64,
    /// Playback position.
    pub media_time: f64,
    /// Events processed by this poll.
    pub processed: u32,
    /// Events processed since load.
    pub total_processed: u64,
}

/// Emitted when a vote transition changes phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoreographyEvent {
    /// Load generation.
    pub generation: u64,
    /// Statement whose transition changed.
    pub statement_id: StatementId,
    /// New phase, `None` when finished.
    pub phase: Option<Phase>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the session.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every processed poll.
    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        _ = e;
    }

    /// Called when a load starts, completes, or is discarded.
    fn on_load(&mut self, e: &LoadEvent) {
        _ = e;
    }

    /// Called when the unlocked frontier moves.
    fn on_unlock(&mut self, e: &UnlockEvent) {
        _ = e;
    }

    /// Called when the active pointer changes.
    fn on_pointer(&mut self, e: &PointerEvent) {
        _ = e;
    }

    /// Called for every recorded vote.
    fn on_vote(&mut self, e: &VoteEvent) {
        _ = e;
    }

    /// Called when a vote is rejected.
    fn on_vote_rejected(&mut self, e: &VoteRejectedEvent) {
        _ = e;
    }

    /// Called when synthetic votes are replayed.
    fn on_synthetic_batch(&mut self, e: &SyntheticBatchEvent) {
        _ = e;
    }

    /// Called when a vote transition changes phase.
    fn on_choreography(&mut self, e: &ChoreographyEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`PollTickEvent`].
        poll_tick => on_poll_tick(PollTickEvent)
    );
    dispatch!(
        /// Emits a [`LoadEvent`].
        load => on_load(LoadEvent)
    );
    dispatch!(
        /// Emits an [`UnlockEvent`].
        unlock => on_unlock(UnlockEvent)
    );
    dispatch!(
        /// Emits a [`PointerEvent`].
        pointer => on_pointer(PointerEvent)
    );
    dispatch!(
        /// Emits a [`VoteEvent`].
        vote => on_vote(VoteEvent)
    );
    dispatch!(
        /// Emits a [`VoteRejectedEvent`].
        vote_rejected => on_vote_rejected(VoteRejectedEvent)
    );
    dispatch!(
        /// Emits a [`SyntheticBatchEvent`].
        synthetic_batch => on_synthetic_batch(SyntheticBatchEvent)
    );
    dispatch!(
        /// Emits a [`ChoreographyEvent`].
        choreography => on_choreography(ChoreographyEvent)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
