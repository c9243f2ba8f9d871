// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for votesync
//! diagnostics.
//!
//! This crate provides [`TraceSink`](votesync_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`tee::TeeSink`]: drives two sinks from one
//!   [`Tracer`](votesync_core::trace::Tracer).

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod tee;
