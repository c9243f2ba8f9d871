// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration presets.

use crate::poll::PollConfig;
use crate::synth::DelayParams;
use crate::transition::ChoreographyTimings;

/// Configuration for a [`Session`](crate::session::Session) and its
/// [`Driver`](crate::driver::Driver).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Poll cadence.
    pub poll: PollConfig,
    /// Number of synthetic participants.
    pub participants: u32,
    /// Synthetic reaction delay distribution.
    pub delay: DelayParams,
    /// Decay window for synthetic vote flashes, in media seconds.
    pub flash_window: f64,
    /// Vote choreography phase durations.
    pub choreography: ChoreographyTimings,
    /// Seed for the default random source.
    pub seed: u64,
    /// EMA smoothing factor for the playback rate estimate (0.0–1.0).
    pub rate_alpha: f64,
    /// EMA smoothing factor for the playback offset estimate (0.0–1.0).
    pub offset_alpha: f64,
}

impl SessionConfig {
    /// Two polls per second, 25 participants.
    #[must_use]
    pub const fn reference() -> Self {
        Self {
            poll: PollConfig::relaxed(),
            participants: 25,
            delay: DelayParams::REFERENCE,
            flash_window: 0.5,
            choreography: ChoreographyTimings::STANDARD,
            seed: 0x5eed,
            rate_alpha: 0.1,
            offset_alpha: 0.3,
        }
    }

    /// Ten polls per second with lighter smoothing.
    #[must_use]
    pub const fn responsive() -> Self {
        Self {
            poll: PollConfig::responsive(),
            rate_alpha: 0.05,
            offset_alpha: 0.15,
            ..Self::reference()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::reference()
    }
}
