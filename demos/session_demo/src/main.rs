// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless session that exercises loading, polling, voting and tracing.
//!
//! Plays 50 seconds of a simulated video at 60 Hz against a
//! [`ManualClock`], votes on each statement shortly after it becomes active,
//! adds a statement mid-playback, pauses and seeks. Events go to both a
//! [`PrettyPrintSink`] and a [`RecorderSink`]; the recording is exported as a
//! Chrome trace.
//!
//! Usage: `session_demo [VIDEO_URL]`. Statement and transcript files are read
//! from this crate's `data/` directory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use kurbo::Size;
use votesync_core::clock::ManualClock;
use votesync_core::config::SessionConfig;
use votesync_core::driver::Driver;
use votesync_core::session::Session;
use votesync_core::statement::StatementId;
use votesync_core::time::HostTime;
use votesync_core::timeline::{DrawKind, TimelineLayout};
use votesync_core::trace::Tracer;
use votesync_core::vote::VoteValue;
use votesync_data::layout::DataLayout;
use votesync_data::statements::{vote_to_json, write_statements};
use votesync_data::video::parse_video_url;
use votesync_debug::pretty::PrettyPrintSink;
use votesync_debug::recorder::RecorderSink;
use votesync_debug::tee::TeeSink;

const FRAME_NS: u64 = 16_666_667;
const FRAME_SECS: f64 = 1.0 / 60.0;
const RUN_NS: u64 = 50_000_000_000;
/// Seconds a participant reads before voting.
const READ_SECS: f64 = 1.2;

const PAUSE_AT_NS: u64 = 22_000_000_000;
const RESUME_AT_NS: u64 = 24_000_000_000;
const SEEK_AT_NS: u64 = 33_000_000_000;
const SEEK_BY_SECS: f64 = 6.0;
const APPEND_AT_NS: u64 = 14_000_000_000;

fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.youtube.com/watch?v=demo".to_owned());
    let video = match parse_video_url(&url) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let layout = DataLayout::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));
    let data = layout.fetch_video_data(&video);
    for e in &data.errors {
        eprintln!("warning: {e}");
    }

    // -- sinks -------------------------------------------------------------
    let mut sinks = TeeSink::new(
        PrettyPrintSink::new(Box::new(std::io::stdout())).without_polls(),
        RecorderSink::new(),
    );

    // -- session -----------------------------------------------------------
    let config = SessionConfig::reference();
    let mut session = Session::new(config);
    let mut driver = Driver::new(ManualClock::at(0.0), &config);
    let mut votes: Vec<String> = Vec::new();

    {
        let mut tracer = Tracer::new(&mut sinks);

        let ticket = session.load_video(video.clone(), &mut tracer);
        driver.on_load(&ticket, HostTime(0));
        match session.complete_load(&ticket, data.statements, &mut tracer) {
            Ok(report) => println!(
                "loaded {} statements, {} synthetic votes{}",
                report.statement_count,
                report.synthetic_events,
                if report.degraded { " (degraded)" } else { "" },
            ),
            Err(e) => eprintln!("load failed: {e}"),
        }

        // Nothing is unlocked yet.
        let _ = driver.vote(&mut session, VoteValue::Agree, &mut tracer);

        // -- simulated playback ---------------------------------------------
        let mut now: u64 = 0;
        let mut active_since: Option<(StatementId, f64)> = None;
        let mut voted: Vec<StatementId> = Vec::new();
        let mut next_vote = VoteValue::ALL.iter().copied().cycle();

        while now < RUN_NS {
            now += FRAME_NS;
            let host = HostTime(now);

            let playing = !(PAUSE_AT_NS..RESUME_AT_NS).contains(&now);
            if playing {
                driver.clock_mut().advance(FRAME_SECS);
            }
            if now == SEEK_AT_NS - SEEK_AT_NS % FRAME_NS {
                driver.clock_mut().advance(SEEK_BY_SECS);
                println!("-- seek +{SEEK_BY_SECS}s");
            }
            if now == APPEND_AT_NS - APPEND_AT_NS % FRAME_NS {
                let at = session.last_media_time().unwrap_or(0.0) + 3.0;
                let report = session.append_statement(
                    at,
                    "Ticket prices should be set by an independent board.",
                    &mut tracer,
                );
                println!(
                    "-- appended statement {} at {at:.1}s (index {})",
                    report.statement_id, report.index
                );
            }

            let _ = driver.on_host_tick(&mut session, host, &mut tracer);
            let Some(t) = driver.on_frame(&mut session, host, &mut tracer) else {
                continue;
            };

            let active = session.active_statement().map(|s| s.statement_id);
            match (active, active_since) {
                (Some(id), Some((prev, _))) if id == prev => {}
                (Some(id), _) => active_since = Some((id, t)),
                (None, _) => active_since = None,
            }
            if let Some((id, since)) = active_since {
                if t - since >= READ_SECS && !voted.contains(&id) {
                    let value = next_vote.next().unwrap_or(VoteValue::Pass);
                    if let Ok(out) = driver.vote(&mut session, value, &mut tracer) {
                        voted.push(id);
                        if let Some(seg) = data.transcript.as_ref().and_then(|tr| tr.segment_at(t))
                        {
                            println!("   (speaker: {})", seg.text);
                        }
                        match vote_to_json(&out.vote) {
                            Ok(json) => votes.push(json),
                            Err(e) => eprintln!("vote serialization failed: {e}"),
                        }
                    }
                }
            }
        }
        driver.shutdown();
    }

    // -- summary -----------------------------------------------------------
    let changes = session.take_changes();
    println!(
        "pending changes: {} unlocked, {} pointer, {} tallies, {} statements",
        changes.unlocked.len(),
        changes.pointer.len(),
        changes.tallies.len(),
        changes.statements.len(),
    );
    for (id, tally) in session.replay().tallies() {
        println!(
            "statement {id}: agree={} disagree={} pass={}",
            tally.agree, tally.disagree, tally.pass
        );
    }
    for line in session.preview(3) {
        println!("next: {}", line.text);
    }
    let t = session.last_media_time().unwrap_or(0.0);
    let items = session.timeline(t, &TimelineLayout::new(Size::new(960.0, 48.0)));
    let markers = items
        .iter()
        .filter(|i| matches!(i.kind, DrawKind::Marker { .. }))
        .count();
    println!("timeline at {t:.1}s: {} draw items, {markers} markers", items.len());

    // -- outputs -----------------------------------------------------------
    write_statements(Path::new("statements.json"), session.statements())
        .expect("failed to write statements.json");
    fs::write("votes.jsonl", votes.join("\n") + "\n").expect("failed to write votes.jsonl");

    let (_, recorder) = sinks.into_inner();
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    votesync_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!(
        "Wrote statements.json, votes.jsonl ({} votes) and {path}",
        votes.len()
    );
}
