// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! The trace's time axis is **media time**: a viewer shows what happened at
//! each point of the video. Events that carry no playback position (loads,
//! choreography) are placed at the most recent position seen before them.
//! Each load generation becomes its own process row.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const TID_SESSION: u32 = 0;
const TID_VOTES: u32 = 1;
const TID_CROWD: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut cursor = 0.0_f64;

    for recorded in decode(bytes) {
        let pid = recorded.generation();
        match recorded {
            RecordedEvent::PollTick(e) => {
                let Some(t) = e.media_time else {
                    continue;
                };
                cursor = t;
                events.push(json!({
                    "ph": "i",
                    "name": "Poll",
                    "cat": "Poll",
                    "ts": secs_to_us(t),
                    "pid": pid,
                    "tid": TID_SESSION,
                    "s": "t",
                    "args": {
                        "poll_index": e.poll_index,
                        "host_ms": e.now.nanos() as f64 / 1e6,
                        "skipped": e.skipped,
                    }
                }));
            }
            RecordedEvent::Load(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Load{:?}", e.outcome),
                    "cat": "Load",
                    "ts": secs_to_us(cursor),
                    "pid": pid,
                    "tid": TID_SESSION,
                    "s": "p",
                    "args": {
                        "ticket_generation": e.ticket_generation,
                        "statement_count": e.statement_count,
                    }
                }));
            }
            RecordedEvent::Unlock(e) => {
                cursor = e.media_time;
                events.push(json!({
                    "ph": "i",
                    "name": "Unlock",
                    "cat": "Session",
                    "ts": secs_to_us(e.media_time),
                    "pid": pid,
                    "tid": TID_SESSION,
                    "s": "p",
                    "args": {
                        "previous": e.previous,
                        "unlocked_index": e.unlocked_index,
                    }
                }));
            }
            RecordedEvent::Pointer(e) => {
                cursor = e.media_time;
                events.push(json!({
                    "ph": "i",
                    "name": "Pointer",
                    "cat": "Session",
                    "ts": secs_to_us(e.media_time),
                    "pid": pid,
                    "tid": TID_SESSION,
                    "s": "t",
                    "args": {
                        "before": e.before.to_string(),
                        "after": e.after.to_string(),
                        "cause": format!("{:?}", e.cause),
                    }
                }));
            }
            RecordedEvent::Vote(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Vote {}", e.vote.vote.as_str()),
                    "cat": "Vote",
                    "ts": secs_to_us(cursor),
                    "pid": pid,
                    "tid": TID_VOTES,
                    "s": "t",
                    "args": {
                        "statement_id": e.vote.statement_id.0,
                        "loaded_timecode": e.vote.loaded_timecode,
                        "video_timecode": e.vote.video_timecode,
                        "revised": e.revised,
                    }
                }));
            }
            RecordedEvent::VoteRejected(e) => {
                if let Some(t) = e.media_time {
                    cursor = t;
                }
                events.push(json!({
                    "ph": "i",
                    "name": "VoteRejected",
                    "cat": "Vote",
                    "ts": secs_to_us(cursor),
                    "pid": pid,
                    "tid": TID_VOTES,
                    "s": "t",
                    "args": {
                        "error": e.error.to_string(),
                    }
                }));
            }
            RecordedEvent::SyntheticBatch(e) => {
                cursor = e.media_time;
                events.push(json!({
                    "ph": "C",
                    "name": "SyntheticVotes",
                    "cat": "Crowd",
                    "ts": secs_to_us(e.media_time),
                    "pid": pid,
                    "tid": TID_CROWD,
                    "args": {
                        "total": e.total_processed,
                    }
                }));
            }
            RecordedEvent::Choreography(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.phase.map_or_else(|| "Settled".to_owned(), |p| format!("{p:?}")),
                    "cat": "Choreography",
                    "ts": secs_to_us(cursor),
                    "pid": pid,
                    "tid": TID_VOTES,
                    "s": "t",
                    "args": {
                        "statement_id": e.statement_id.0,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn secs_to_us(seconds: f64) -> f64 {
    seconds * 1e6
}
