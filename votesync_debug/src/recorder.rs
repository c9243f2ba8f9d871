// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`]. Floats are stored as their IEEE-754 bits, so
//! media times survive exactly.

use votesync_core::statement::StatementId;
use votesync_core::time::HostTime;
use votesync_core::trace::{
    ChoreographyEvent, LoadEvent, LoadOutcome, PointerCause, PointerEvent, PollTickEvent,
    SyntheticBatchEvent, TraceSink, UnlockEvent, VoteEvent, VoteRejectedEvent,
};
use votesync_core::transition::Phase;
use votesync_core::vote::{ActivePointer, Vote, VoteError, VoteValue};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_POLL_TICK: u8 = 1;
const TAG_LOAD: u8 = 2;
const TAG_UNLOCK: u8 = 3;
const TAG_POINTER: u8 = 4;
const TAG_VOTE: u8 = 5;
const TAG_VOTE_REJECTED: u8 = 6;
const TAG_SYNTHETIC_BATCH: u8 = 7;
const TAG_CHOREOGRAPHY: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_i8(&mut self, v: i8) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_option_f64(&mut self, v: Option<f64>) {
        self.write_option_u64(v.map(f64::to_bits));
    }

    fn write_index(&mut self, v: Option<usize>) {
        self.write_option_u64(v.map(|i| i as u64));
    }

    fn write_pointer(&mut self, p: ActivePointer) {
        let (kind, index) = match p {
            ActivePointer::NoActive => (0, 0),
            ActivePointer::Active(i) => (1, i),
            ActivePointer::Waiting(i) => (2, i),
        };
        self.write_u8(kind);
        self.write_u64(index as u64);
    }

    fn write_statement(&mut self, id: StatementId) {
        self.write_i64(id.0);
    }

    fn write_vote(&mut self, v: &Vote) {
        self.write_i8(v.vote.as_i8());
        self.write_statement(v.statement_id);
        self.write_f64(v.loaded_timecode);
        self.write_u64(v.video_timecode);
    }

    fn write_phase(&mut self, p: Option<Phase>) {
        self.write_u8(match p {
            None => 0,
            Some(Phase::Flash) => 1,
            Some(Phase::Fade) => 2,
            Some(Phase::Shift) => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        self.write_u8(TAG_POLL_TICK);
        self.write_u64(e.generation);
        self.write_u64(e.poll_index);
        self.write_u64(e.now.nanos());
        self.write_option_f64(e.media_time);
        self.write_u32(e.skipped);
    }

    fn on_load(&mut self, e: &LoadEvent) {
        self.write_u8(TAG_LOAD);
        self.write_u64(e.generation);
        self.write_u64(e.ticket_generation);
        self.write_u8(match e.outcome {
            LoadOutcome::Started => 0,
            LoadOutcome::Applied => 1,
            LoadOutcome::Degraded => 2,
            LoadOutcome::Stale => 3,
        });
        self.write_u32(e.statement_count);
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        self.write_u8(TAG_UNLOCK);
        self.write_u64(e.generation);
        self.write_f64(e.media_time);
        self.write_index(e.previous);
        self.write_u64(e.unlocked_index as u64);
    }

    fn on_pointer(&mut self, e: &PointerEvent) {
        self.write_u8(TAG_POINTER);
        self.write_u64(e.generation);
        self.write_f64(e.media_time);
        self.write_pointer(e.before);
        self.write_pointer(e.after);
        self.write_u8(match e.cause {
            PointerCause::FirstUnlock => 0,
            PointerCause::DeferredAdvance => 1,
            PointerCause::LazyActivation => 2,
            PointerCause::Vote => 3,
            PointerCause::Insert => 4,
        });
    }

    fn on_vote(&mut self, e: &VoteEvent) {
        self.write_u8(TAG_VOTE);
        self.write_u64(e.generation);
        self.write_vote(&e.vote);
        self.write_u8(u8::from(e.revised));
    }

    fn on_vote_rejected(&mut self, e: &VoteRejectedEvent) {
        self.write_u8(TAG_VOTE_REJECTED);
        self.write_u64(e.generation);
        self.write_option_f64(e.media_time);
        match e.error {
            VoteError::NoActiveStatement => {
                self.write_u8(0);
                self.write_i64(0);
            }
            VoteError::TransitionInFlight { statement_id } => {
                self.write_u8(1);
                self.write_statement(statement_id);
            }
        }
    }

    fn on_synthetic_batch(&mut self, e: &SyntheticBatchEvent) {
        self.write_u8(TAG_SYNTHETIC_BATCH);
        self.write_u64(e.generation);
        self.write_f64(e.media_time);
        self.write_u32(e.processed);
        self.write_u64(e.total_processed);
    }

    fn on_choreography(&mut self, e: &ChoreographyEvent) {
        self.write_u8(TAG_CHOREOGRAPHY);
        self.write_u64(e.generation);
        self.write_statement(e.statement_id);
        self.write_phase(e.phase);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PollTickEvent`].
    PollTick(PollTickEvent),
    /// A [`LoadEvent`].
    Load(LoadEvent),
    /// An [`UnlockEvent`].
    Unlock(UnlockEvent),
    /// A [`PointerEvent`].
    Pointer(PointerEvent),
    /// A [`VoteEvent`].
    Vote(VoteEvent),
    /// A [`VoteRejectedEvent`].
    VoteRejected(VoteRejectedEvent),
    /// A [`SyntheticBatchEvent`].
    SyntheticBatch(SyntheticBatchEvent),
    /// A [`ChoreographyEvent`].
    Choreography(ChoreographyEvent),
}

impl RecordedEvent {
    /// Load generation the event belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::PollTick(e) => e.generation,
            Self::Load(e) => e.generation,
            Self::Unlock(e) => e.generation,
            Self::Pointer(e) => e.generation,
            Self::Vote(e) => e.generation,
            Self::VoteRejected(e) => e.generation,
            Self::SyntheticBatch(e) => e.generation,
            Self::Choreography(e) => e.generation,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_i8(&mut self) -> Option<i8> {
        self.take().map(i8::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_option_f64(&mut self) -> Option<Option<f64>> {
        Some(self.read_option_u64()?.map(f64::from_bits))
    }

    fn read_index(&mut self) -> Option<Option<usize>> {
        match self.read_option_u64()? {
            Some(v) => Some(Some(usize::try_from(v).ok()?)),
            None => Some(None),
        }
    }

    fn read_pointer(&mut self) -> Option<ActivePointer> {
        let kind = self.read_u8()?;
        let index = self.read_usize()?;
        Some(match kind {
            0 => ActivePointer::NoActive,
            1 => ActivePointer::Active(index),
            _ => ActivePointer::Waiting(index),
        })
    }

    fn read_statement(&mut self) -> Option<StatementId> {
        self.read_i64().map(StatementId)
    }

    fn read_vote(&mut self) -> Option<Vote> {
        Some(Vote {
            vote: VoteValue::try_from(self.read_i8()?).ok()?,
            statement_id: self.read_statement()?,
            loaded_timecode: self.read_f64()?,
            video_timecode: self.read_u64()?,
        })
    }

    fn read_phase(&mut self) -> Option<Option<Phase>> {
        Some(match self.read_u8()? {
            0 => None,
            1 => Some(Phase::Flash),
            2 => Some(Phase::Fade),
            _ => Some(Phase::Shift),
        })
    }

    fn decode_poll_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PollTick(PollTickEvent {
            generation: self.read_u64()?,
            poll_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            media_time: self.read_option_f64()?,
            skipped: self.read_u32()?,
        }))
    }

    fn decode_load(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Load(LoadEvent {
            generation: self.read_u64()?,
            ticket_generation: self.read_u64()?,
            outcome: match self.read_u8()? {
                0 => LoadOutcome::Started,
                1 => LoadOutcome::Applied,
                2 => LoadOutcome::Degraded,
                _ => LoadOutcome::Stale,
            },
            statement_count: self.read_u32()?,
        }))
    }

    fn decode_unlock(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unlock(UnlockEvent {
            generation: self.read_u64()?,
            media_time: self.read_f64()?,
            previous: self.read_index()?,
            unlocked_index: self.read_usize()?,
        }))
    }

    fn decode_pointer(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Pointer(PointerEvent {
            generation: self.read_u64()?,
            media_time: self.read_f64()?,
            before: self.read_pointer()?,
            after: self.read_pointer()?,
            cause: match self.read_u8()? {
                0 => PointerCause::FirstUnlock,
                1 => PointerCause::DeferredAdvance,
                2 => PointerCause::LazyActivation,
                3 => PointerCause::Vote,
                _ => PointerCause::Insert,
            },
        }))
    }

    fn decode_vote(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Vote(VoteEvent {
            generation: self.read_u64()?,
            vote: self.read_vote()?,
            revised: self.read_u8()? != 0,
        }))
    }

    fn decode_vote_rejected(&mut self) -> Option<RecordedEvent> {
        let generation = self.read_u64()?;
        let media_time = self.read_option_f64()?;
        let kind = self.read_u8()?;
        let statement_id = self.read_statement()?;
        let error = match kind {
            0 => VoteError::NoActiveStatement,
            _ => VoteError::TransitionInFlight { statement_id },
        };
        Some(RecordedEvent::VoteRejected(VoteRejectedEvent {
            generation,
            media_time,
            error,
        }))
    }

    fn decode_synthetic_batch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SyntheticBatch(SyntheticBatchEvent {
            generation: self.read_u64()?,
            media_time: self.read_f64()?,
            processed: self.read_u32()?,
            total_processed: self.read_u64()?,
        }))
    }

    fn decode_choreography(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Choreography(ChoreographyEvent {
            generation: self.read_u64()?,
            statement_id: self.read_statement()?,
            phase: self.read_phase()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_POLL_TICK => self.decode_poll_tick(),
            TAG_LOAD => self.decode_load(),
            TAG_UNLOCK => self.decode_unlock(),
            TAG_POINTER => self.decode_pointer(),
            TAG_VOTE => self.decode_vote(),
            TAG_VOTE_REJECTED => self.decode_vote_rejected(),
            TAG_SYNTHETIC_BATCH => self.decode_synthetic_batch(),
            TAG_CHOREOGRAPHY => self.decode_choreography(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vote() -> VoteEvent {
        VoteEvent {
            generation: 2,
            vote: Vote {
                vote: VoteValue::Disagree,
                statement_id: StatementId(-4),
                loaded_timecode: 12.5,
                video_timecode: 14,
            },
            revised: true,
        }
    }

    #[test]
    fn records_every_event_kind_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_load(&LoadEvent {
            generation: 2,
            ticket_generation: 1,
            outcome: LoadOutcome::Stale,
            statement_count: 0,
        });
        rec.on_poll_tick(&PollTickEvent {
            generation: 2,
            poll_index: 9,
            now: HostTime(4_500_000_000),
            media_time: None,
            skipped: 1,
        });
        rec.on_unlock(&UnlockEvent {
            generation: 2,
            media_time: 0.1 + 0.2,
            previous: None,
            unlocked_index: 3,
        });
        rec.on_pointer(&PointerEvent {
            generation: 2,
            media_time: 6.0,
            before: ActivePointer::Waiting(0),
            after: ActivePointer::Active(1),
            cause: PointerCause::DeferredAdvance,
        });
        rec.on_vote(&sample_vote());
        rec.on_vote_rejected(&VoteRejectedEvent {
            generation: 2,
            media_time: Some(1.0),
            error: VoteError::TransitionInFlight {
                statement_id: StatementId(8),
            },
        });
        rec.on_synthetic_batch(&SyntheticBatchEvent {
            generation: 2,
            media_time: 7.0,
            processed: 3,
            total_processed: 40,
        });
        rec.on_choreography(&ChoreographyEvent {
            generation: 2,
            statement_id: StatementId(1),
            phase: None,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 8, "all events decoded");
        assert!(events.iter().all(|e| e.generation() == 2), "generation kept");

        match &events[2] {
            RecordedEvent::Unlock(e) => {
                assert_eq!(e.media_time.to_bits(), (0.1_f64 + 0.2).to_bits(), "exact");
                assert_eq!(e.previous, None);
                assert_eq!(e.unlocked_index, 3);
            }
            other => panic!("expected Unlock, got {other:?}"),
        }
        assert_eq!(events[4], RecordedEvent::Vote(sample_vote()));
        match &events[5] {
            RecordedEvent::VoteRejected(e) => assert_eq!(
                e.error,
                VoteError::TransitionInFlight {
                    statement_id: StatementId(8)
                }
            ),
            other => panic!("expected VoteRejected, got {other:?}"),
        }
        assert!(matches!(
            events[7],
            RecordedEvent::Choreography(ChoreographyEvent { phase: None, .. })
        ));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_vote(&sample_vote());
        rec.on_vote(&sample_vote());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1, "second record is incomplete");
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        assert_eq!(decode(&[0xff, 1, 2, 3]).count(), 0, "unknown tag");
        assert_eq!(decode(&[]).count(), 0, "empty");
    }
}
