// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback clock seam and between-poll interpolation.
//!
//! [`ClockSource`] is implemented by the embedding player (an iframe API, a
//! `<video>` element, a test double). The session only ever reads it through
//! [`current_time`](ClockSource::current_time).
//!
//! [`PlaybackEstimator`] extrapolates the playback position from the last
//! poll. Polls feed readings in and learn whether playback continued, paused
//! or jumped; the redraw loop queries it at display cadence so the timeline
//! scrolls smoothly even when the poll period is 500 ms.

use crate::time::HostTime;

/// Source of the current playback position.
///
/// `current_time` must be monotonic non-decreasing while playing. Seeking may
/// move it backwards; the unlock tracker tolerates that.
pub trait ClockSource {
    /// Returns the playback position in seconds, or `None` while the player
    /// is not ready (or has been destroyed).
    fn current_time(&self) -> Option<f64>;

    /// Returns whether the player has finished initializing.
    fn is_ready(&self) -> bool {
        self.current_time().is_some()
    }

    /// Tears the player down. Subsequent reads return `None`.
    fn destroy(&mut self) {}
}

/// A [`ClockSource`] whose position is set explicitly.
///
/// Used by headless drivers and tests.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    position: Option<f64>,
}

impl ManualClock {
    /// Creates a clock that is not yet ready.
    #[must_use]
    pub const fn new() -> Self {
        Self { position: None }
    }

    /// Creates a ready clock at the given position.
    #[must_use]
    pub const fn at(seconds: f64) -> Self {
        Self {
            position: Some(seconds),
        }
    }

    /// Moves the playhead. Marks the clock ready.
    pub fn set(&mut self, seconds: f64) {
        self.position = Some(seconds);
    }

    /// Advances the playhead by `seconds` (no-op while not ready).
    pub fn advance(&mut self, seconds: f64) {
        if let Some(p) = &mut self.position {
            *p += seconds;
        }
    }
}

impl ClockSource for ManualClock {
    fn current_time(&self) -> Option<f64> {
        self.position
    }

    fn destroy(&mut self) {
        self.position = None;
    }
}

/// A jump larger than this between the estimate and a clock reading, in media
/// seconds, is treated as a seek.
pub const SEEK_THRESHOLD: f64 = 1.0;

/// How [`PlaybackEstimator::observe`] classified a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Observation {
    /// First reading since construction or [`reset`](PlaybackEstimator::reset).
    First,
    /// Playback continued; rate and anchor were smoothed toward the reading.
    Tracked,
    /// The position did not move since the previous reading.
    Paused,
    /// The position moved again after a pause.
    Resumed,
    /// The reading was more than [`SEEK_THRESHOLD`] away from the estimate.
    Seeked,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    host: f64,
    media: f64,
}

/// Playback position between polls.
///
/// Tracks an anchor `(host, media)` and a rate, so that while playing
///
/// ```text
/// media_time(host) = anchor.media + rate * (host - anchor.host)
/// ```
///
/// Each poll reading is classified (see [`Observation`]). Ordinary readings
/// nudge the rate and anchor by exponential smoothing. Pauses hold the
/// position; resumes and seeks re-anchor exactly, so the playhead never
/// smears across a jump or coasts through a pause.
#[derive(Clone, Debug)]
pub struct PlaybackEstimator {
    /// Media seconds per host second.
    rate: f64,
    /// Smoothing factor for rate updates, in `[0, 1]`.
    rate_alpha: f64,
    /// Smoothing factor pulling the anchor toward readings, in `[0, 1]`.
    offset_alpha: f64,
    anchor: Option<Sample>,
    last: Option<Sample>,
    paused: bool,
}

impl PlaybackEstimator {
    /// Creates an estimator assuming normal playback speed.
    #[must_use]
    pub const fn new(rate_alpha: f64, offset_alpha: f64) -> Self {
        Self {
            rate: 1.0,
            rate_alpha,
            offset_alpha,
            anchor: None,
            last: None,
            paused: false,
        }
    }

    /// Estimated media time at `host`, or `None` before the first reading.
    /// Held at the last reading while paused.
    #[must_use]
    pub fn media_time_at(&self, host: HostTime) -> Option<f64> {
        let anchor = self.anchor?;
        if self.paused {
            return Some(anchor.media);
        }
        Some(anchor.media + self.rate * (host_secs(host) - anchor.host))
    }

    /// Current rate estimate (1.0 at normal speed).
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether the last reading found playback paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feeds a reading taken at a poll and reports how it was interpreted.
    pub fn observe(&mut self, host: HostTime, media_time: f64) -> Observation {
        let sample = Sample {
            host: host_secs(host),
            media: media_time,
        };
        let (Some(last), Some(predicted)) = (self.last, self.media_time_at(host)) else {
            self.anchor_at(sample, false);
            return Observation::First;
        };

        if sample.host > last.host && sample.media == last.media {
            self.anchor_at(sample, true);
            return Observation::Paused;
        }
        if (predicted - sample.media).abs() > SEEK_THRESHOLD {
            self.anchor_at(sample, false);
            return Observation::Seeked;
        }
        if self.paused {
            self.anchor_at(sample, false);
            return Observation::Resumed;
        }

        let dt = sample.host - last.host;
        if dt > 0.0 {
            let observed = (sample.media - last.media) / dt;
            self.rate += self.rate_alpha * (observed - self.rate);
        }
        let predicted = self.media_time_at(host).unwrap_or(sample.media);
        self.anchor = Some(Sample {
            host: sample.host,
            media: predicted + self.offset_alpha * (sample.media - predicted),
        });
        self.last = Some(sample);
        Observation::Tracked
    }

    /// Forgets every reading. The rate estimate is kept.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.last = None;
        self.paused = false;
    }

    fn anchor_at(&mut self, sample: Sample, paused: bool) {
        self.anchor = Some(sample);
        self.last = Some(sample);
        self.paused = paused;
    }
}

fn host_secs(host: HostTime) -> f64 {
    host.nanos() as f64 / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1_000_000_000;

    #[test]
    fn manual_clock_lifecycle() {
        let mut clock = ManualClock::new();
        assert!(!clock.is_ready());
        clock.advance(1.0);
        assert_eq!(clock.current_time(), None, "advance before ready is a no-op");
        clock.set(2.0);
        clock.advance(0.5);
        assert_eq!(clock.current_time(), Some(2.5));
        clock.destroy();
        assert!(!clock.is_ready());
    }

    #[test]
    fn estimator_uninitialized_returns_none() {
        let est = PlaybackEstimator::new(0.1, 0.1);
        assert!(est.media_time_at(HostTime(SEC)).is_none());
    }

    #[test]
    fn first_observation_sets_mapping_exactly() {
        let mut est = PlaybackEstimator::new(0.1, 0.1);
        assert_eq!(est.observe(HostTime(10 * SEC), 3.0), Observation::First);
        let mt = est.media_time_at(HostTime(11 * SEC)).unwrap();
        assert!((mt - 4.0).abs() < 1e-9, "expected 4.0, got {mt}");
    }

    #[test]
    fn interpolates_between_polls() {
        let mut est = PlaybackEstimator::new(0.2, 0.2);
        for i in 0..10_u64 {
            let _ = est.observe(HostTime(i * SEC / 2), i as f64 * 0.5);
        }
        let mt = est.media_time_at(HostTime(4 * SEC + SEC / 4)).unwrap();
        assert!((mt - 4.25).abs() < 0.05, "expected ~4.25, got {mt}");
    }

    #[test]
    fn rate_converges_on_fast_playback() {
        let mut est = PlaybackEstimator::new(0.5, 0.5);
        for i in 0..20_u64 {
            let obs = est.observe(HostTime(i * SEC / 2), i as f64 * 0.75);
            assert_ne!(obs, Observation::Seeked, "reading {i} is continuous");
        }
        assert!((est.rate() - 1.5).abs() < 1e-3, "rate {}", est.rate());
        let mt = est.media_time_at(HostTime(10 * SEC + SEC / 4)).unwrap();
        assert!((mt - 15.375).abs() < 0.01, "got {mt}");
    }

    #[test]
    fn pause_holds_then_resume_reanchors() {
        let mut est = PlaybackEstimator::new(0.1, 0.1);
        let _ = est.observe(HostTime(0), 5.0);
        let _ = est.observe(HostTime(SEC / 2), 5.5);
        assert_eq!(est.observe(HostTime(SEC), 5.5), Observation::Paused);
        assert!(est.is_paused());
        assert_eq!(est.media_time_at(HostTime(3 * SEC)), Some(5.5), "held");

        assert_eq!(est.observe(HostTime(4 * SEC), 5.75), Observation::Resumed);
        let mt = est.media_time_at(HostTime(4 * SEC + SEC / 2)).unwrap();
        assert!((mt - 6.25).abs() < 1e-9, "no coasting through the pause, got {mt}");
    }

    #[test]
    fn jump_is_a_seek() {
        let mut est = PlaybackEstimator::new(0.1, 0.1);
        let _ = est.observe(HostTime(0), 0.0);
        let _ = est.observe(HostTime(SEC), 1.0);
        assert_eq!(est.observe(HostTime(2 * SEC), 60.0), Observation::Seeked);
        let mt = est.media_time_at(HostTime(3 * SEC)).unwrap();
        assert!((mt - 61.0).abs() < 1e-9, "expected 61.0, got {mt}");

        assert_eq!(est.observe(HostTime(4 * SEC), 30.0), Observation::Seeked, "backwards");
    }

    #[test]
    fn reset_forgets_readings() {
        let mut est = PlaybackEstimator::new(0.1, 0.1);
        let _ = est.observe(HostTime(0), 9.0);
        est.reset();
        assert!(est.media_time_at(HostTime(SEC)).is_none());
        assert_eq!(est.observe(HostTime(SEC), 2.0), Observation::First);
    }
}
