// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrolling timeline visualization.
//!
//! [`render`] is a pure function from the session's observable state to an
//! ordered list of [`DrawItem`]s. The playhead sits at a fixed horizontal
//! position; statements scroll from right to left as playback advances.
//!
//! ```text
//!   ┌──────────────────────────┬───────────────────────────────────┐
//!   │  past (seconds_before)   │        future (seconds_after)     │
//!   │    ▮ tally bars          │  ▯ locked markers fade in within  │
//!   │  ▮ marker                │    the 0.5 s approach window      │
//!   └──────────────────────────┴───────────────────────────────────┘
//!                           playhead
//! ```
//!
//! Items are emitted back to front: background, markers, tally bars, flash
//! halos, playhead.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::ease::approach;
use crate::statement::{Statement, StatementId};
use crate::synth::VoteReplay;
use crate::unlock::UnlockState;
use crate::vote::{ActivePointer, VoteValue};

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Colors used by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Track background.
    pub background: Rgba8,
    /// Playhead line.
    pub playhead: Rgba8,
    /// Statement not yet reached.
    pub locked: Rgba8,
    /// Reached statement.
    pub unlocked: Rgba8,
    /// Statement under the pointer.
    pub active: Rgba8,
    /// Agree votes.
    pub agree: Rgba8,
    /// Disagree votes.
    pub disagree: Rgba8,
    /// Passes.
    pub pass: Rgba8,
}

impl Palette {
    /// Dark theme.
    pub const DARK: Self = Self {
        background: Rgba8::rgb(0x12, 0x14, 0x1a),
        playhead: Rgba8::rgb(0xf5, 0xf5, 0xf5),
        locked: Rgba8::rgb(0x4a, 0x4f, 0x5c),
        unlocked: Rgba8::rgb(0x9a, 0xa3, 0xb5),
        active: Rgba8::rgb(0xff, 0xc1, 0x07),
        agree: Rgba8::rgb(0x2e, 0xcc, 0x71),
        disagree: Rgba8::rgb(0xe7, 0x4c, 0x3c),
        pass: Rgba8::rgb(0x95, 0xa5, 0xa6),
    };

    /// Color for a vote value.
    #[must_use]
    pub const fn vote(&self, vote: VoteValue) -> Rgba8 {
        match vote {
            VoteValue::Agree => self.agree,
            VoteValue::Disagree => self.disagree,
            VoteValue::Pass => self.pass,
        }
    }
}

/// Geometry of the timeline strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineLayout {
    /// Strip size in pixels.
    pub size: Size,
    /// Seconds of history left of the playhead.
    pub seconds_before: f64,
    /// Seconds of future right of the playhead.
    pub seconds_after: f64,
    /// Statement marker width.
    pub marker_width: f64,
    /// Width of one tally bar.
    pub bar_width: f64,
    /// Playhead width.
    pub playhead_width: f64,
    /// Colors.
    pub palette: Palette,
}

impl TimelineLayout {
    /// A 30 s window (10 s past, 20 s future) over the given size.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            seconds_before: 10.0,
            seconds_after: 20.0,
            marker_width: 4.0,
            bar_width: 3.0,
            playhead_width: 2.0,
            palette: Palette::DARK,
        }
    }

    /// Horizontal pixels per media second.
    #[must_use]
    pub fn pixels_per_second(&self) -> f64 {
        let span = self.seconds_before + self.seconds_after;
        if span <= 0.0 {
            return 0.0;
        }
        self.size.width / span
    }

    /// X coordinate of the playhead.
    #[must_use]
    pub fn playhead_x(&self) -> f64 {
        self.seconds_before * self.pixels_per_second()
    }

    /// X coordinate of media time `t` when the playhead is at `current_time`.
    #[must_use]
    pub fn x_for(&self, t: f64, current_time: f64) -> f64 {
        self.playhead_x() + (t - current_time) * self.pixels_per_second()
    }

    fn visible(&self, t: f64, current_time: f64) -> bool {
        t >= current_time - self.seconds_before && t <= current_time + self.seconds_after
    }
}

/// Marker state, derived from the unlock state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerState {
    /// Not yet reached.
    Locked,
    /// Reached, not under the pointer.
    Unlocked,
    /// Under the pointer, awaiting a vote.
    Active,
    /// Under the pointer, voted, waiting for the next unlock.
    Waiting,
}

/// What a [`DrawItem`] depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// Strip background.
    Background,
    /// A statement marker.
    Marker {
        /// Statement.
        statement_id: StatementId,
        /// Marker state.
        state: MarkerState,
    },
    /// One segment of a statement's stacked tally bar.
    TallyBar {
        /// Statement.
        statement_id: StatementId,
        /// Vote value counted by this segment.
        vote: VoteValue,
    },
    /// A decaying highlight behind a statement that just received votes.
    Flash {
        /// Statement.
        statement_id: StatementId,
        /// Vote value of the most recent flash.
        vote: VoteValue,
    },
    /// The playhead.
    Playhead,
}

/// One draw primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    /// What is drawn.
    pub kind: DrawKind,
    /// Where, in strip coordinates.
    pub rect: Rect,
    /// Fill color.
    pub color: Rgba8,
    /// Opacity in `[0, 1]`, applied on top of the color's alpha.
    pub opacity: f64,
}

/// Everything [`render`] reads.
#[derive(Clone, Copy, Debug)]
pub struct TimelineInput<'a> {
    /// Playhead position in media seconds (usually interpolated).
    pub current_time: f64,
    /// Sorted statements.
    pub statements: &'a [Statement],
    /// Unlock state.
    pub state: &'a UnlockState,
    /// Synthetic vote replay (tallies and flashes).
    pub replay: &'a VoteReplay,
}

fn marker_state(index: usize, state: &UnlockState) -> MarkerState {
    match state.pointer {
        ActivePointer::Active(i) if i == index => MarkerState::Active,
        ActivePointer::Waiting(i) if i == index => MarkerState::Waiting,
        _ if state.is_unlocked(index) => MarkerState::Unlocked,
        _ => MarkerState::Locked,
    }
}

/// Renders the timeline.
#[must_use]
pub fn render(input: &TimelineInput<'_>, layout: &TimelineLayout) -> Vec<DrawItem> {
    let t = input.current_time;
    let height = layout.size.height;
    let palette = &layout.palette;
    let mut items = Vec::new();

    items.push(DrawItem {
        kind: DrawKind::Background,
        rect: Rect::from_origin_size(Point::ORIGIN, layout.size),
        color: palette.background,
        opacity: 1.0,
    });

    let visible: Vec<(usize, &Statement)> = input
        .statements
        .iter()
        .enumerate()
        .filter(|(_, s)| layout.visible(s.timecode, t))
        .collect();

    for &(i, s) in &visible {
        let state = marker_state(i, input.state);
        let x = layout.x_for(s.timecode, t);
        let (color, opacity) = match state {
            // Locked markers ease in as the playhead approaches.
            MarkerState::Locked => (palette.locked, 0.35 + 0.65 * approach(s.timecode, t)),
            MarkerState::Unlocked => (palette.unlocked, 1.0),
            MarkerState::Active | MarkerState::Waiting => (palette.active, 1.0),
        };
        items.push(DrawItem {
            kind: DrawKind::Marker {
                statement_id: s.statement_id,
                state,
            },
            rect: Rect::new(
                x - layout.marker_width / 2.0,
                0.0,
                x + layout.marker_width / 2.0,
                height,
            ),
            color,
            opacity,
        });
    }

    let max_total = visible
        .iter()
        .map(|(_, s)| input.replay.tally(s.statement_id).total())
        .max()
        .unwrap_or(0);
    if max_total > 0 {
        let lane = height * 0.8;
        for &(_, s) in &visible {
            let tally = input.replay.tally(s.statement_id);
            let x0 = layout.x_for(s.timecode, t) + layout.marker_width;
            let mut y = height;
            for (k, vote) in VoteValue::ALL.into_iter().enumerate() {
                let n = tally.get(vote);
                if n == 0 {
                    continue;
                }
                let h = lane * f64::from(n) / f64::from(max_total);
                let x = x0 + k as f64 * layout.bar_width;
                items.push(DrawItem {
                    kind: DrawKind::TallyBar {
                        statement_id: s.statement_id,
                        vote,
                    },
                    rect: Rect::new(x, y - h, x + layout.bar_width, y),
                    color: palette.vote(vote),
                    opacity: 0.9,
                });
                y -= h;
            }
        }
    }

    for &(_, s) in &visible {
        let intensity = input.replay.flash_intensity(s.statement_id, t);
        if intensity <= 0.0 {
            continue;
        }
        let Some(latest) = input
            .replay
            .flashes()
            .iter()
            .rev()
            .find(|f| f.statement_id == s.statement_id)
        else {
            continue;
        };
        let x = layout.x_for(s.timecode, t);
        let r = layout.marker_width * 3.0;
        items.push(DrawItem {
            kind: DrawKind::Flash {
                statement_id: s.statement_id,
                vote: latest.vote,
            },
            rect: Rect::new(x - r, 0.0, x + r, height),
            color: palette.vote(latest.vote),
            opacity: intensity,
        });
    }

    let px = layout.playhead_x();
    items.push(DrawItem {
        kind: DrawKind::Playhead,
        rect: Rect::new(
            px - layout.playhead_width / 2.0,
            0.0,
            px + layout.playhead_width / 2.0,
            height,
        ),
        color: palette.playhead,
        opacity: 1.0,
    });

    items
}
