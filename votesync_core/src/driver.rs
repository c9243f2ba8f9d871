// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glue between host callbacks and a [`Session`].
//!
//! The embedding environment calls [`Driver::on_host_tick`] from its timer
//! and [`Driver::on_frame`] from its redraw loop, both with a host timestamp.
//! The driver paces polls, reads the [`ClockSource`], keeps a
//! [`PlaybackEstimator`] in sync and forwards everything to the session.
//!
//! ```text
//!   timer ──► on_host_tick ──► Poller ──► ClockSource ──► Session::tick
//!                                              │
//!                                              ▼
//!   vsync ──► on_frame ◄──────────────── PlaybackEstimator
//!                │
//!                ├──► Session::advance_transition
//!                └──► render time for Session::timeline
//! ```

use rand::Rng;

use crate::clock::{ClockSource, PlaybackEstimator};
use crate::config::SessionConfig;
use crate::poll::Poller;
use crate::session::{LoadTicket, Session, TickReport};
use crate::time::HostTime;
use crate::trace::Tracer;
use crate::vote::{VoteError, VoteOutcome, VoteValue};

/// Drives a session from host callbacks.
#[derive(Debug)]
pub struct Driver<C> {
    clock: C,
    poller: Poller,
    estimator: PlaybackEstimator,
    last_frame: Option<HostTime>,
}

impl<C: ClockSource> Driver<C> {
    /// Creates a driver reading `clock`.
    pub fn new(clock: C, config: &SessionConfig) -> Self {
        Self {
            clock,
            poller: Poller::new(config.poll),
            estimator: PlaybackEstimator::new(config.rate_alpha, config.offset_alpha),
            last_frame: None,
        }
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock (test doubles, seeking).
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The playback estimate fed by polls.
    pub fn estimator(&self) -> &PlaybackEstimator {
        &self.estimator
    }

    /// Restarts polling for a fresh load.
    pub fn on_load(&mut self, ticket: &LoadTicket, now: HostTime) {
        self.poller.restart(ticket.generation(), now);
        self.estimator.reset();
    }

    /// Timer callback. Runs a session tick if a poll is due.
    pub fn on_host_tick<R: Rng>(
        &mut self,
        session: &mut Session<R>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<TickReport> {
        let tick = self.poller.poll(now)?;
        let media_time = self.clock.current_time();
        if let Some(t) = media_time {
            let _ = self.estimator.observe(now, t);
        }
        Some(session.tick(&tick, media_time, tracer))
    }

    /// Redraw callback. Advances vote choreography by the host time elapsed
    /// since the previous frame and returns the playback position to render
    /// at, if known.
    pub fn on_frame<R: Rng>(
        &mut self,
        session: &mut Session<R>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<f64> {
        if let Some(prev) = self.last_frame {
            let _ = session.advance_transition(now.saturating_duration_since(prev), tracer);
        }
        self.last_frame = Some(now);
        self.render_time(now)
    }

    /// Interpolated playback position at `now`, held while paused.
    #[must_use]
    pub fn render_time(&self, now: HostTime) -> Option<f64> {
        self.estimator.media_time_at(now)
    }

    /// Casts a vote at the clock's current position.
    pub fn vote<R: Rng>(
        &mut self,
        session: &mut Session<R>,
        value: VoteValue,
        tracer: &mut Tracer<'_>,
    ) -> Result<VoteOutcome, VoteError> {
        let t = self
            .clock
            .current_time()
            .or(session.last_media_time())
            .unwrap_or(0.0);
        session.cast_vote(value, t, tracer)
    }

    /// Stops polling and destroys the clock.
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.clock.destroy();
    }
}
