//! Live battle demo — real threads, clocks, and synthetic sources.
//!
//! The left stream is a seeded Poisson process; the right follows a script
//! that idles, bursts hard, then idles again.  The driver thread closes a
//! window per side every 500 ms and the observer logs every close and every
//! lead change as they happen.
//!
//! Run with:
//!   cargo run --example live_poisson --features sim

use std::thread;
use std::time::Duration;

use tracing::{info, Level};

use faceoff::sim::{PoissonSource, ScriptedSource};
use faceoff::{
    Battle, BattleObserver, Comparator, Contender, LeadChange, Sampler, SamplerConfig, Side,
    WindowReport,
};

struct LogObserver;

impl BattleObserver for LogObserver {
    fn on_new_count(&mut self, report: &WindowReport) {
        let score = report
            .score
            .map(|s| format!("{s:+.3}"))
            .unwrap_or("--".into());
        info!(
            "[{:?}] window {} closed: count={} score={} aggregate={:+.3}",
            report.side, report.window_index, report.count, score, report.aggregate
        );
    }

    fn on_lead_change(&mut self, change: &LeadChange) {
        info!(
            ">>> lead change: {} now leads ({:+.3} vs {:+.3}, previously {:?})",
            change.leader_label, change.leader_aggregate, change.trailing_aggregate, change.previous
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // Half-second windows keep the demo short; the scoring pipeline is
    // identical at any period.
    let cfg = SamplerConfig::default().window_ms(500);
    let left = Sampler::new(
        Contender::new("poisson", "Poisson ~9 Hz"),
        Side::Left,
        cfg.clone(),
    )
    .unwrap();
    let right = Sampler::new(
        Contender::new("bursty", "Idle-then-burst"),
        Side::Right,
        cfg,
    )
    .unwrap();
    let comparator = Comparator::new(left, right).unwrap();

    // Right: two seconds of idling, a 30-pulse burst, then quiet again.
    let mut schedule = vec![250u64; 8];
    schedule.extend(std::iter::repeat(15).take(30));
    schedule.extend(std::iter::repeat(250).take(6));

    let mut battle = Battle::new(
        comparator,
        Box::new(PoissonSource::new(9.0, 7)),
        Box::new(ScriptedSource::new(schedule)),
        Box::new(LogObserver),
    );

    info!("starting battle (5 seconds)...");
    battle.start().unwrap();
    thread::sleep(Duration::from_secs(5));
    battle.stop();

    let summary = battle.summary().expect("battle is stopped");
    println!("\n=== Final standings ===");
    for s in [&summary.left, &summary.right] {
        println!(
            "  {:16}  windows={}  aggregate={:+.3}  baseline mean={:.2} sd={:.2}",
            s.label, s.windows, s.aggregate, s.baseline_mean, s.baseline_std_dev
        );
    }
    match summary.leader {
        Some(side) => println!("Leader at stop: {side:?}"),
        None => println!("No leader at stop."),
    }
}
