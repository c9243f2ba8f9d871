// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamped transcripts.
//!
//! Transcript files are plain text. A line starting with `MM:SS` or `H:MM:SS`
//! followed by whitespace opens a segment at that time; any other non-blank
//! line continues the previous segment. Text before the first timestamp forms
//! a segment starting at 0.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn stamp_pattern() -> Result<&'static Regex, regex::Error> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:(\d+):)?(\d{1,2}):([0-5]\d)(?:\s+(.*))?$"))
        .as_ref()
        .map_err(Clone::clone)
}

/// A run of transcript text starting at a point in the video.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    /// Start, in media seconds.
    pub start: f64,
    /// Text, lines joined with a space.
    pub text: String,
}

/// A parsed transcript, segments sorted by start time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Parses transcript text.
    pub fn parse(text: &str) -> Result<Self, regex::Error> {
        let pattern = stamp_pattern()?;
        let mut segments: Vec<TranscriptSegment> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(seg) = pattern.captures(line).and_then(|c| stamped_segment(&c)) {
                segments.push(seg);
                continue;
            }
            match segments.last_mut() {
                Some(seg) => {
                    if !seg.text.is_empty() {
                        seg.text.push(' ');
                    }
                    seg.text.push_str(line);
                }
                None => segments.push(TranscriptSegment {
                    start: 0.0,
                    text: line.to_owned(),
                }),
            }
        }
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(Self { segments })
    }

    /// All segments.
    #[must_use]
    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    /// The segment being spoken at `time`: the last one starting at or before
    /// it.
    #[must_use]
    pub fn segment_at(&self, time: f64) -> Option<&TranscriptSegment> {
        let n = self.segments.partition_point(|s| s.start <= time);
        n.checked_sub(1).map(|i| &self.segments[i])
    }

    /// Whether the transcript has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Builds a segment from a matched stamp line, or `None` if a field does not
/// fit, in which case the line is plain text.
fn stamped_segment(c: &Captures<'_>) -> Option<TranscriptSegment> {
    let field = |i: usize| c.get(i).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());
    let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);
    Some(TranscriptSegment {
        start: f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds),
        text: c.get(4).map_or("", |m| m.as_str().trim()).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Welcome everyone.
00:05 First point
  continues here.

1:02:03 Much later
02:30 Middle
";

    #[test]
    fn parses_stamps_and_continuations() {
        let t = Transcript::parse(SAMPLE).unwrap();
        let starts: Vec<f64> = t.segments().iter().map(|s| s.start).collect();
        assert_eq!(starts, [0.0, 5.0, 150.0, 3723.0], "sorted by start");
        assert_eq!(t.segments()[0].text, "Welcome everyone.");
        assert_eq!(t.segments()[1].text, "First point continues here.");
    }

    #[test]
    fn segment_lookup() {
        let t = Transcript::parse(SAMPLE).unwrap();
        assert_eq!(t.segment_at(0.0).unwrap().start, 0.0, "preamble");
        assert_eq!(t.segment_at(149.9).unwrap().start, 5.0, "before middle");
        assert_eq!(t.segment_at(5000.0).unwrap().start, 3723.0, "last");

        let stamped = Transcript::parse("00:10 hi").unwrap();
        assert!(stamped.segment_at(3.0).is_none(), "nothing yet");
    }

    #[test]
    fn bare_stamp_opens_empty_segment() {
        let t = Transcript::parse("00:07\nthen text").unwrap();
        assert_eq!(t.segments().len(), 1, "one segment");
        assert_eq!(t.segments()[0].text, "then text");
        assert!(Transcript::parse("\n  \n").unwrap().is_empty(), "blank");
    }

    #[test]
    fn invalid_seconds_are_text() {
        let t = Transcript::parse("00:75 not a stamp").unwrap();
        assert_eq!(t.segments()[0].start, 0.0, "treated as text");
        assert_eq!(t.segments()[0].text, "00:75 not a stamp");
    }

    #[test]
    fn oversized_hours_are_text() {
        let t = Transcript::parse("00:04 opening\n99999999999:00:01 not a stamp").unwrap();
        assert_eq!(t.segments().len(), 1, "no segment at 0 s");
        assert_eq!(t.segments()[0].start, 4.0);
        assert_eq!(t.segments()[0].text, "opening 99999999999:00:01 not a stamp");
    }
}
