// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Media times
//! are printed in seconds.

use std::io::Write;

use votesync_core::trace::{
    ChoreographyEvent, LoadEvent, PointerEvent, PollTickEvent, SyntheticBatchEvent, TraceSink,
    UnlockEvent, VoteEvent, VoteRejectedEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    polls: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("polls", &self.polls)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            polls: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            polls: true,
        }
    }

    /// Omits poll lines, which otherwise dominate the output.
    #[must_use]
    pub fn without_polls(mut self) -> Self {
        self.polls = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn index(i: Option<usize>) -> String {
    i.map_or_else(|| "-".to_owned(), |i| i.to_string())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        if !self.polls {
            return;
        }
        let t = e
            .media_time
            .map_or_else(|| "not-ready".to_owned(), |t| format!("{t:.3}s"));
        let _ = writeln!(
            self.writer,
            "[poll] gen={} #{} t={t} skipped={}",
            e.generation, e.poll_index, e.skipped,
        );
    }

    fn on_load(&mut self, e: &LoadEvent) {
        let _ = writeln!(
            self.writer,
            "[load] gen={} ticket={} {:?} statements={}",
            e.generation, e.ticket_generation, e.outcome, e.statement_count,
        );
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        let _ = writeln!(
            self.writer,
            "[unlock] gen={} t={:.3}s {} -> {}",
            e.generation,
            e.media_time,
            index(e.previous),
            e.unlocked_index,
        );
    }

    fn on_pointer(&mut self, e: &PointerEvent) {
        let _ = writeln!(
            self.writer,
            "[pointer] gen={} t={:.3}s {} -> {} ({:?})",
            e.generation, e.media_time, e.before, e.after, e.cause,
        );
    }

    fn on_vote(&mut self, e: &VoteEvent) {
        let revised = if e.revised { " revised" } else { "" };
        let _ = writeln!(
            self.writer,
            "[vote] gen={} {} statement={} loaded={:.1}s video={}s{revised}",
            e.generation,
            e.vote.vote.as_str(),
            e.vote.statement_id,
            e.vote.loaded_timecode,
            e.vote.video_timecode,
        );
    }

    fn on_vote_rejected(&mut self, e: &VoteRejectedEvent) {
        let _ = writeln!(
            self.writer,
            "[vote:rejected] gen={} {}",
            e.generation, e.error,
        );
    }

    fn on_synthetic_batch(&mut self, e: &SyntheticBatchEvent) {
        let _ = writeln!(
            self.writer,
            "[crowd] gen={} t={:.3}s +{} total={}",
            e.generation, e.media_time, e.processed, e.total_processed,
        );
    }

    fn on_choreography(&mut self, e: &ChoreographyEvent) {
        let phase = e
            .phase
            .map_or_else(|| "settled".to_owned(), |p| format!("{p:?}").to_lowercase());
        let _ = writeln!(
            self.writer,
            "[transition] gen={} statement={} {phase}",
            e.generation, e.statement_id,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votesync_core::statement::StatementId;
    use votesync_core::time::HostTime;
    use votesync_core::trace::{LoadOutcome, PointerCause};
    use votesync_core::vote::ActivePointer;

    #[test]
    fn pretty_print_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_load(&LoadEvent {
            generation: 3,
            ticket_generation: 2,
            outcome: LoadOutcome::Stale,
            statement_count: 0,
        });
        sink.on_pointer(&PointerEvent {
            generation: 3,
            media_time: 5.0,
            before: ActivePointer::Waiting(0),
            after: ActivePointer::Active(1),
            cause: PointerCause::DeferredAdvance,
        });
        sink.on_choreography(&ChoreographyEvent {
            generation: 3,
            statement_id: StatementId(9),
            phase: None,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3, "got: {output}");
        assert!(lines[0].starts_with("[load] gen=3 ticket=2 Stale"), "got: {output}");
        assert!(lines[1].contains("DeferredAdvance"), "got: {output}");
        assert!(lines[2].ends_with("statement=9 settled"), "got: {output}");
    }

    #[test]
    fn polls_can_be_muted() {
        let tick = PollTickEvent {
            generation: 1,
            poll_index: 4,
            now: HostTime(0),
            media_time: None,
            skipped: 0,
        };
        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new());
        loud.on_poll_tick(&tick);
        let out = String::from_utf8(loud.into_inner()).unwrap();
        assert!(out.contains("t=not-ready"), "got: {out}");

        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_polls();
        quiet.on_poll_tick(&tick);
        assert!(quiet.into_inner().is_empty(), "muted");
    }
}
