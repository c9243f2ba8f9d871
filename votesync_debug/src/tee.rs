// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use votesync_core::trace::{
    ChoreographyEvent, LoadEvent, PointerEvent, PollTickEvent, SyntheticBatchEvent, TraceSink,
    UnlockEvent, VoteEvent, VoteRejectedEvent,
};

/// A [`TraceSink`] that forwards every event to `A` and then `B`.
///
/// A [`Tracer`](votesync_core::trace::Tracer) holds a single sink; nest tees
/// for more than two.
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    /// First destination.
    pub first: A,
    /// Second destination.
    pub second: B,
}

impl<A, B> TeeSink<A, B> {
    /// Combines two sinks.
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Splits the tee back into its sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

macro_rules! forward {
    ($($method:ident($ty:ty);)*) => {
        $(
            fn $method(&mut self, e: &$ty) {
                self.first.$method(e);
                self.second.$method(e);
            }
        )*
    };
}

impl<A: TraceSink, B: TraceSink> TraceSink for TeeSink<A, B> {
    forward! {
        on_poll_tick(PollTickEvent);
        on_load(LoadEvent);
        on_unlock(UnlockEvent);
        on_pointer(PointerEvent);
        on_vote(VoteEvent);
        on_vote_rejected(VoteRejectedEvent);
        on_synthetic_batch(SyntheticBatchEvent);
        on_choreography(ChoreographyEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::PrettyPrintSink;
    use crate::recorder::{RecordedEvent, RecorderSink, decode};
    use votesync_core::trace::LoadOutcome;

    #[test]
    fn both_sinks_receive_events() {
        let mut tee = TeeSink::new(
            RecorderSink::new(),
            PrettyPrintSink::with_writer(Vec::<u8>::new()),
        );
        tee.on_load(&LoadEvent {
            generation: 1,
            ticket_generation: 1,
            outcome: LoadOutcome::Started,
            statement_count: 0,
        });
        let (rec, pretty) = tee.into_inner();
        assert!(
            matches!(
                decode(rec.as_bytes()).next(),
                Some(RecordedEvent::Load(_))
            ),
            "recorded"
        );
        assert!(!pretty.into_inner().is_empty(), "printed");
    }
}
