// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing for the timeline.
//!
//! Timeline animation has no state of its own: how far an item has eased in is
//! a pure function of how far ahead of the playhead its target time lies.

/// Width of the approach window, in media seconds.
pub const TRANSITION_WINDOW: f64 = 0.5;

/// Cubic ease-in-out on `[0, 1]`. Inputs outside the range are clamped.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Linear progress through the window that ends at `target_time`.
///
/// `0.0` while the target is at least [`TRANSITION_WINDOW`] away, `1.0` once
/// the playhead has reached it.
#[must_use]
pub fn window_progress(target_time: f64, current_time: f64) -> f64 {
    let remaining = target_time - current_time;
    if remaining <= 0.0 {
        1.0
    } else if remaining >= TRANSITION_WINDOW {
        0.0
    } else {
        1.0 - remaining / TRANSITION_WINDOW
    }
}

/// Eased approach value for an item due at `target_time`.
#[must_use]
pub fn approach(target_time: f64, current_time: f64) -> f64 {
    ease_in_out_cubic(window_progress(target_time, current_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn cubic_endpoints_and_midpoint() {
        assert!(close(ease_in_out_cubic(0.0), 0.0), "start");
        assert!(close(ease_in_out_cubic(0.5), 0.5), "midpoint");
        assert!(close(ease_in_out_cubic(1.0), 1.0), "end");
        assert!(close(ease_in_out_cubic(0.25), 0.0625), "4t^3 branch");
        assert!(close(ease_in_out_cubic(0.75), 0.9375), "upper branch");
    }

    #[test]
    fn cubic_is_monotone() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_cubic(f64::from(i) / 100.0);
            assert!(v >= prev, "dropped at step {i}");
            prev = v;
        }
    }

    #[test]
    fn approach_window() {
        assert!(close(approach(10.0, 9.0), 0.0), "outside window");
        assert!(close(approach(10.0, 9.75), 0.5), "halfway");
        assert!(close(approach(10.0, 10.0), 1.0), "arrived");
        assert!(close(approach(10.0, 12.0), 1.0), "past");
    }
}
