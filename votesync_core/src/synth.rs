// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic crowd votes.
//!
//! At load time every statement gets a random *bias* (how the crowd leans and
//! how often it passes), and every (participant, statement) pair draws one
//! vote plus a reaction delay. The resulting events are sorted once by time.
//!
//! [`VoteReplay`] then plays the events back against the playback clock,
//! counting each exactly once no matter how often or how irregularly it is
//! called.
//!
//! The random source is injected so a seeded generator reproduces the exact
//! event set.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::f64::consts::TAU;

use rand::Rng;

use crate::statement::{Statement, StatementId};
use crate::vote::VoteValue;

/// Parameters of the clamped normal reaction delay, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayParams {
    /// Mean delay.
    pub mean: f64,
    /// Standard deviation.
    pub std_dev: f64,
    /// Lower clamp.
    pub min: f64,
    /// Upper clamp.
    pub max: f64,
}

impl DelayParams {
    /// Mean 3 s, standard deviation 2 s, clamped to `[1, 8]`.
    pub const REFERENCE: Self = Self {
        mean: 3.0,
        std_dev: 2.0,
        min: 1.0,
        max: 8.0,
    };

    /// Draws one delay using the Box–Muller transform.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // 1 - U(0,1) lies in (0, 1], keeping ln() finite.
        let u1 = 1.0 - rng.random::<f64>();
        let u2 = rng.random::<f64>();
        let z = libm::sqrt(-2.0 * libm::log(u1)) * libm::cos(TAU * u2);
        (self.mean + self.std_dev * z).clamp(self.min, self.max)
    }
}

impl Default for DelayParams {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// How the crowd leans on one statement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatementBias {
    /// Probability of a pass.
    pub p_pass: f64,
    /// Probability of agreeing.
    pub p_agree: f64,
    /// Probability of disagreeing.
    pub p_disagree: f64,
}

impl StatementBias {
    /// Draws a bias: `lean ~ U(-1, 1)`, `p_pass ~ U(0.05, 0.15)`, and the
    /// remaining mass split according to the lean.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let lean = rng.random_range(-1.0..1.0);
        let p_pass = rng.random_range(0.05..0.15);
        Self::from_lean(lean, p_pass)
    }

    /// Builds a bias from an explicit lean in `[-1, 1]` and pass probability.
    #[must_use]
    pub fn from_lean(lean: f64, p_pass: f64) -> Self {
        let rest = 1.0 - p_pass;
        Self {
            p_pass,
            p_agree: rest * (1.0 + lean) / 2.0,
            p_disagree: rest * (1.0 - lean) / 2.0,
        }
    }

    /// Draws a vote from this distribution.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> VoteValue {
        let r = rng.random::<f64>();
        if r < self.p_pass {
            VoteValue::Pass
        } else if r < self.p_pass + self.p_agree {
            VoteValue::Agree
        } else {
            VoteValue::Disagree
        }
    }
}

/// Synthetic participant identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u32);

/// One synthetic vote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticVoteEvent {
    /// Voter.
    pub participant: ParticipantId,
    /// Statement voted on.
    pub statement_id: StatementId,
    /// Vote value.
    pub vote: VoteValue,
    /// Media time at which the vote lands.
    pub timecode: f64,
}

impl SyntheticVoteEvent {
    fn key(&self) -> EventKey {
        (self.participant, self.statement_id, self.timecode.to_bits())
    }
}

type EventKey = (ParticipantId, StatementId, u64);

/// Generates the events for one statement, unsorted.
pub fn generate_for_statement<R: Rng + ?Sized>(
    statement: &Statement,
    participants: u32,
    delay: &DelayParams,
    rng: &mut R,
) -> Vec<SyntheticVoteEvent> {
    let bias = StatementBias::sample(rng);
    (0..participants)
        .map(|p| {
            let vote = bias.pick(rng);
            let d = delay.sample(rng);
            SyntheticVoteEvent {
                participant: ParticipantId(p),
                statement_id: statement.statement_id,
                vote,
                timecode: statement.timecode + d,
            }
        })
        .collect()
}

/// Generates `participants × statements.len()` events sorted by time.
pub fn generate<R: Rng + ?Sized>(
    statements: &[Statement],
    participants: u32,
    delay: &DelayParams,
    rng: &mut R,
) -> Vec<SyntheticVoteEvent> {
    let mut events = Vec::with_capacity(statements.len() * participants as usize);
    for s in statements {
        events.extend(generate_for_statement(s, participants, delay, rng));
    }
    sort_events(&mut events);
    events
}

/// Merges `extra` into an already sorted event list, keeping it sorted.
/// Existing events stay ahead of new ones with equal timecodes.
pub fn merge_events(events: &mut Vec<SyntheticVoteEvent>, extra: Vec<SyntheticVoteEvent>) {
    events.extend(extra);
    sort_events(events);
}

fn sort_events(events: &mut [SyntheticVoteEvent]) {
    events.sort_by(|a, b| a.timecode.total_cmp(&b.timecode));
}

/// Per-statement vote counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Agree votes.
    pub agree: u32,
    /// Disagree votes.
    pub disagree: u32,
    /// Passes.
    pub pass: u32,
}

impl Tally {
    /// Counts one vote.
    pub fn record(&mut self, vote: VoteValue) {
        let slot = match vote {
            VoteValue::Agree => &mut self.agree,
            VoteValue::Disagree => &mut self.disagree,
            VoteValue::Pass => &mut self.pass,
        };
        *slot = slot.saturating_add(1);
    }

    /// Count for one value.
    #[must_use]
    pub const fn get(&self, vote: VoteValue) -> u32 {
        match vote {
            VoteValue::Agree => self.agree,
            VoteValue::Disagree => self.disagree,
            VoteValue::Pass => self.pass,
        }
    }

    /// Total number of votes.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.agree
            .saturating_add(self.disagree)
            .saturating_add(self.pass)
    }
}

/// A short-lived highlight registered when a synthetic vote lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flash {
    /// Statement that received the vote.
    pub statement_id: StatementId,
    /// Vote value (selects the color).
    pub vote: VoteValue,
    /// Media time at which the vote was replayed.
    pub started_at: f64,
}

impl Flash {
    /// Linear decay from 1 to 0 over `window` media seconds.
    #[must_use]
    pub fn intensity(&self, current_time: f64, window: f64) -> f64 {
        let age = current_time - self.started_at;
        if age < 0.0 || age >= window || window <= 0.0 {
            return 0.0;
        }
        1.0 - age / window
    }
}

/// Plays synthetic events back against the playback clock.
#[derive(Clone, Debug)]
pub struct VoteReplay {
    processed: BTreeSet<EventKey>,
    tallies: BTreeMap<StatementId, Tally>,
    flashes: Vec<Flash>,
    flash_window: f64,
}

impl VoteReplay {
    /// Creates an empty replay with the given flash decay window.
    #[must_use]
    pub const fn new(flash_window: f64) -> Self {
        Self {
            processed: BTreeSet::new(),
            tallies: BTreeMap::new(),
            flashes: Vec::new(),
            flash_window,
        }
    }

    /// Counts every not-yet-processed event with `timecode <= current_time`.
    ///
    /// Returns the number of newly processed events. Events are never removed
    /// from `events`; the processed set alone prevents double counting.
    pub fn process(&mut self, events: &[SyntheticVoteEvent], current_time: f64) -> usize {
        self.process_each(events, current_time, |_| {})
    }

    /// Like [`process`](Self::process), calling `on_event` for each newly
    /// processed event.
    pub fn process_each(
        &mut self,
        events: &[SyntheticVoteEvent],
        current_time: f64,
        mut on_event: impl FnMut(&SyntheticVoteEvent),
    ) -> usize {
        self.prune(current_time);
        let mut count = 0;
        for e in events {
            if e.timecode > current_time {
                break;
            }
            if !self.processed.insert(e.key()) {
                continue;
            }
            self.tallies.entry(e.statement_id).or_default().record(e.vote);
            self.flashes.push(Flash {
                statement_id: e.statement_id,
                vote: e.vote,
                started_at: current_time,
            });
            on_event(e);
            count += 1;
        }
        count
    }

    /// Drops flashes that have fully decayed (or lie ahead after a seek
    /// back).
    pub fn prune(&mut self, current_time: f64) {
        let window = self.flash_window;
        self.flashes
            .retain(|f| f.intensity(current_time, window) > 0.0);
    }

    /// Tally for one statement.
    #[must_use]
    pub fn tally(&self, id: StatementId) -> Tally {
        self.tallies.get(&id).copied().unwrap_or_default()
    }

    /// All tallies, by statement id.
    #[must_use]
    pub fn tallies(&self) -> &BTreeMap<StatementId, Tally> {
        &self.tallies
    }

    /// Live flashes.
    #[must_use]
    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Flash decay window, in media seconds.
    #[must_use]
    pub const fn flash_window(&self) -> f64 {
        self.flash_window
    }

    /// Strongest flash intensity on a statement.
    #[must_use]
    pub fn flash_intensity(&self, id: StatementId, current_time: f64) -> f64 {
        self.flashes
            .iter()
            .filter(|f| f.statement_id == id)
            .map(|f| f.intensity(current_time, self.flash_window))
            .fold(0.0, f64::max)
    }

    /// Number of events processed so far.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.processed.clear();
        self.tallies.clear();
        self.flashes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn statements() -> Vec<Statement> {
        vec![
            Statement::new(StatementId(1), 0.0, "a"),
            Statement::new(StatementId(2), 10.0, "b"),
            Statement::new(StatementId(3), 20.0, "c"),
        ]
    }

    #[test]
    fn generates_one_event_per_participant_and_statement() {
        let mut rng = SmallRng::seed_from_u64(7);
        let list = statements();
        let events = generate(&list, 25, &DelayParams::REFERENCE, &mut rng);
        assert_eq!(events.len(), 25 * list.len());

        for e in &events {
            let s = list.iter().find(|s| s.statement_id == e.statement_id).unwrap();
            let d = e.timecode - s.timecode;
            assert!((1.0..=8.0).contains(&d), "delay {d} out of bounds");
        }
        assert!(
            events.windows(2).all(|w| w[0].timecode <= w[1].timecode),
            "events must be sorted"
        );
    }

    #[test]
    fn same_seed_same_events() {
        let list = statements();
        let a = generate(&list, 10, &DelayParams::REFERENCE, &mut SmallRng::seed_from_u64(3));
        let b = generate(&list, 10, &DelayParams::REFERENCE, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn bias_probabilities_sum_to_one() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let b = StatementBias::sample(&mut rng);
            let sum = b.p_pass + b.p_agree + b.p_disagree;
            assert!((sum - 1.0).abs() < 1e-12, "sum {sum}");
            assert!((0.05..0.15).contains(&b.p_pass), "p_pass {}", b.p_pass);
        }
    }

    #[test]
    fn full_lean_never_disagrees() {
        let mut rng = SmallRng::seed_from_u64(5);
        let b = StatementBias::from_lean(1.0, 0.0);
        for _ in 0..200 {
            assert_eq!(b.pick(&mut rng), VoteValue::Agree);
        }
    }

    #[test]
    fn replay_is_idempotent() {
        let mut rng = SmallRng::seed_from_u64(9);
        let events = generate(&statements(), 25, &DelayParams::REFERENCE, &mut rng);
        let mut replay = VoteReplay::new(0.5);

        let first = replay.process(&events, 15.0);
        let due = events.iter().filter(|e| e.timecode <= 15.0).count();
        assert_eq!(first, due);
        assert_eq!(replay.process(&events, 15.0), 0, "second call adds nothing");

        let total: u32 = replay.tallies().values().map(Tally::total).sum();
        assert_eq!(total as usize, due);
    }

    #[test]
    fn irregular_polling_counts_each_event_once() {
        let mut rng = SmallRng::seed_from_u64(21);
        let list = statements();
        let events = generate(&list, 25, &DelayParams::REFERENCE, &mut rng);
        let mut replay = VoteReplay::new(0.5);
        for t in [0.3, 4.0, 4.0, 2.0, 12.5, 12.6, 40.0, 40.0] {
            let _ = replay.process(&events, t);
        }
        assert_eq!(replay.processed_count(), events.len());
        for s in &list {
            assert_eq!(replay.tally(s.statement_id).total(), 25);
        }
    }

    #[test]
    fn flashes_decay_over_window() {
        let f = Flash {
            statement_id: StatementId(1),
            vote: VoteValue::Agree,
            started_at: 3.0,
        };
        assert!((f.intensity(3.0, 0.5) - 1.0).abs() < 1e-12, "fresh");
        assert!((f.intensity(3.25, 0.5) - 0.5).abs() < 1e-12, "half");
        assert_eq!(f.intensity(3.5, 0.5), 0.0, "expired");
        assert_eq!(f.intensity(2.0, 0.5), 0.0, "before start");
    }

    #[test]
    fn merge_keeps_order() {
        let mut rng = SmallRng::seed_from_u64(1);
        let list = statements();
        let mut events = generate(&list, 5, &DelayParams::REFERENCE, &mut rng);
        let extra = Statement::new(StatementId(4), 5.0, "late");
        let more = generate_for_statement(&extra, 5, &DelayParams::REFERENCE, &mut rng);
        merge_events(&mut events, more);
        assert_eq!(events.len(), 20);
        assert!(events.windows(2).all(|w| w[0].timecode <= w[1].timecode), "sorted");
    }
}
