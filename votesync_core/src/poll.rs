// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Poll pacing.
//!
//! The [`Poller`] converts host-time callbacks (a `setInterval`, a display
//! link, a test loop) into [`PollTick`]s at a fixed cadence. Each tick is the
//! only occasion on which the session reads the playback clock and advances
//! its state.
//!
//! The poller is restarted on every video load; ticks carry the load
//! generation they belong to so a driver can drop work queued for a previous
//! video.

use crate::time::{Duration, HostTime};

/// Configuration for the [`Poller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between polls.
    pub interval: Duration,
    /// When a callback arrives more than this many intervals late, skip the
    /// backlog instead of replaying each missed poll.
    pub max_catch_up: u32,
}

impl PollConfig {
    /// Relaxed cadence: two polls per second.
    #[must_use]
    pub const fn relaxed() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_catch_up: 1,
        }
    }

    /// Responsive cadence: ten polls per second.
    #[must_use]
    pub const fn responsive() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_catch_up: 1,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// A poll opportunity produced by the [`Poller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PollTick {
    /// Host time at which the poll fired.
    pub now: HostTime,
    /// Monotonically increasing poll counter within one generation.
    pub poll_index: u64,
    /// Load generation this tick belongs to.
    pub generation: u64,
    /// Number of intervals skipped since the previous tick.
    pub skipped: u32,
}

/// Fixed-cadence poll pacer.
#[derive(Debug)]
pub struct Poller {
    config: PollConfig,
    next_due: Option<HostTime>,
    poll_index: u64,
    generation: u64,
}

impl Poller {
    /// Creates a stopped poller.
    #[must_use]
    pub const fn new(config: PollConfig) -> Self {
        Self {
            config,
            next_due: None,
            poll_index: 0,
            generation: 0,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Returns whether the poller has been started for the current
    /// generation.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// (Re)starts polling for a new load generation. The first tick is due
    /// immediately.
    pub fn restart(&mut self, generation: u64, now: HostTime) {
        self.generation = generation;
        self.poll_index = 0;
        self.next_due = Some(now);
    }

    /// Stops polling until the next [`restart`](Self::restart).
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns a tick if one is due at `now`.
    ///
    /// Late callbacks produce a single tick; missed intervals are reported in
    /// [`PollTick::skipped`] and never replayed.
    pub fn poll(&mut self, now: HostTime) -> Option<PollTick> {
        let due = self.next_due?;
        if now < due {
            return None;
        }

        let interval = self.config.interval.nanos().max(1);
        let late = now.saturating_duration_since(due).nanos();
        let missed = late / interval;
        let skipped = u32::try_from(missed).unwrap_or(u32::MAX);

        // Realign on the interval grid so a slow host does not accumulate
        // drift; beyond `max_catch_up` intervals of lateness, restart the grid
        // at `now`.
        let next = if skipped > self.config.max_catch_up {
            now.checked_add(self.config.interval)
        } else {
            due.checked_add(Duration((missed + 1) * interval))
        };
        self.next_due = next;

        let tick = PollTick {
            now,
            poll_index: self.poll_index,
            generation: self.generation,
            skipped,
        };
        self.poll_index += 1;
        Some(tick)
    }
}
