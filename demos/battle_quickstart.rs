//! Battle Quickstart — a full two-stream battle in one tape replay.
//!
//! No threads.  No sockets.  No clocks.  Just: build two samplers → pair
//! them in a comparator → replay a recorded traffic tape → watch counts,
//! scores, and the lead evolve window by window.
//!
//! Run with:
//!   cargo run --example battle_quickstart

use std::time::{Duration, Instant};

use faceoff::{Comparator, Contender, Sampler, SamplerConfig, Side, TickOutcome};

fn main() {
    // -----------------------------------------------------------------
    // 1. Two contenders, one comparator.
    // -----------------------------------------------------------------
    // SamplerConfig::default() gives you:
    //   - 1000 ms windows
    //   - a 20-score aggregate span
    // The window period matters to the live layer's clocks; a replay like
    // this one drives closes directly, so only the score span shows up.
    let cfg = SamplerConfig::default();
    let left = Sampler::new(
        Contender::new("rust-stream", "Rust commits"),
        Side::Left,
        cfg.clone(),
    )
    .unwrap();
    let right = Sampler::new(
        Contender::new("go-stream", "Go commits"),
        Side::Right,
        cfg,
    )
    .unwrap();
    let mut battle = Comparator::new(left, right).unwrap();

    // -----------------------------------------------------------------
    // 2. Replay a traffic tape.
    // -----------------------------------------------------------------
    // Events per window: the Rust stream hums along around 5/s and bursts
    // in window 4; the Go stream is metronome-steady the whole time.
    //
    // Note the first window on each side reads one low: the first arrival
    // of a stream's lifetime only opens its gap sequence.
    let left_tape = [4u64, 6, 5, 5, 9, 5, 4];
    let right_tape = [5u64, 5, 5, 5, 5, 5, 5];

    let mut t = Instant::now();
    println!("=== Replay: {} windows ===", left_tape.len());
    println!(
        "{:>3}  {:>14}  {:>5}  {:>8}  {:>8}",
        "w", "side", "count", "score", "aggregate"
    );
    for (w, (&l, &r)) in left_tape.iter().zip(&right_tape).enumerate() {
        for (side, events) in [(Side::Left, l), (Side::Right, r)] {
            for _ in 0..events {
                t += Duration::from_millis(10);
                battle.record_event(side, t);
            }
            print_tick(w, &battle.close_window(side));
        }
    }

    // -----------------------------------------------------------------
    // 3. Final standings.
    // -----------------------------------------------------------------
    let summary = battle.summary();
    println!("\n=== After the tape ===");
    for s in [&summary.left, &summary.right] {
        println!(
            "  {:14}  windows={}  aggregate={:+.3}  baseline mean={:.2} sd={:.2}",
            s.label, s.windows, s.aggregate, s.baseline_mean, s.baseline_std_dev
        );
    }
    match summary.leader {
        Some(side) => println!("\nLeader: {:?} — the burst outweighed the metronome.", side),
        None => println!("\nNo leader — every comparison tied."),
    }

    // -----------------------------------------------------------------
    // 4. Where to go next.
    // -----------------------------------------------------------------
    // - Live wiring (threads, clocks, synthetic sources):
    //     cargo run --example live_poisson --features sim
    // - The same replay, as assertions: tests/scenarios.rs
}

fn print_tick(w: usize, tick: &TickOutcome) {
    let score = tick
        .report
        .score
        .map(|s| format!("{s:+.3}"))
        .unwrap_or("--".into());
    println!(
        "{:>3}  {:>14?}  {:>5}  {:>8}  {:>+8.3}",
        w, tick.report.side, tick.report.count, score, tick.report.aggregate
    );
    if let Some(change) = &tick.lead_change {
        println!(
            "     >>> lead change: {} now leads ({:+.3} vs {:+.3})",
            change.leader_label, change.leader_aggregate, change.trailing_aggregate
        );
    }
}
