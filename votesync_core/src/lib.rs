// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video-synchronized statement voting.
//!
//! `votesync_core` tracks which statements of a video have been "unlocked" by
//! playback, which one a participant is currently voting on, and a simulated
//! crowd of other participants whose votes replay in sync with the video. It
//! is `no_std` compatible (with `alloc`) and free of I/O: the embedding
//! environment supplies a playback clock and host timestamps, and receives
//! reports, change sets and draw lists back.
//!
//! # Architecture
//!
//! ```text
//!   host timer / vsync
//!       │
//!       ▼
//!   Driver ──► Poller ──► PollTick ──► Session::tick()
//!     │                                   │
//!     │                    ┌──────────────┼──────────────┐
//!     │                    ▼              ▼              ▼
//!     │              update_unlocks   VoteReplay    DirtyTracker
//!     │                                               │
//!     ▼                                               ▼
//!   Session::cast_vote() ──► Choreographer     Session::take_changes()
//!                                                     │
//!                                                     ▼
//!                                   timeline::render() / redact::preview()
//! ```
//!
//! **[`session`]**: The single owner of per-video state. Loads are
//! generation-tagged so a superseded load completing late is ignored.
//!
//! **[`unlock`]** and **[`vote`]**: The unlock scan and the active-statement
//! pointer. A vote advances the pointer immediately when the next statement is
//! already unlocked and otherwise waits for it.
//!
//! **[`synth`]**: Seeded synthetic votes with a truncated-normal reaction
//! delay, and an exactly-once replay into tallies and flashes.
//!
//! **[`transition`]**: Phased flash/fade/shift choreography after a vote.
//!
//! **[`timeline`]**, **[`redact`]**, **[`ease`]**: Pure presentation helpers.
//!
//! **[`clock`]**, **[`poll`]**, **[`driver`]**: Playback clock abstraction,
//! poll cadence and the glue between host callbacks and the session.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! session instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for
//!   statements, votes and identifiers.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod dirty;
pub mod driver;
pub mod ease;
pub mod poll;
pub mod redact;
pub mod session;
pub mod statement;
pub mod synth;
pub mod time;
pub mod timeline;
pub mod trace;
pub mod transition;
pub mod unlock;
pub mod vote;
