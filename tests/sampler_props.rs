//! Property tests for Sampler and Comparator.

use std::time::{Duration, Instant};

use faceoff::{Comparator, Contender, Sampler, SamplerConfig, Side};
use proptest::prelude::*;

fn sampler_with(cfg: SamplerConfig) -> Sampler {
    Sampler::new(Contender::new("a", "Alpha"), Side::Left, cfg).unwrap()
}

fn battle() -> Comparator {
    let cfg = SamplerConfig::default();
    let left = Sampler::new(Contender::new("rs", "Rust"), Side::Left, cfg.clone()).unwrap();
    let right = Sampler::new(Contender::new("go", "Go"), Side::Right, cfg).unwrap();
    Comparator::new(left, right).unwrap()
}

/// Record `events` arrivals 10 ms apart, then close the window.
fn feed(s: &mut Sampler, t: &mut Instant, events: u64) -> faceoff::WindowReport {
    for _ in 0..events {
        *t += Duration::from_millis(10);
        s.record_event(*t);
    }
    s.close_window()
}

fn feed_side(c: &mut Comparator, t: &mut Instant, side: Side, events: u64) -> faceoff::TickOutcome {
    for _ in 0..events {
        *t += Duration::from_millis(10);
        c.record_event(side, *t);
    }
    c.close_window(side)
}

/// Open both sides' gap sequences so every window counts its full total.
fn seed_both(c: &mut Comparator, t: &mut Instant) {
    *t += Duration::from_millis(10);
    c.record_event(Side::Left, *t);
    c.record_event(Side::Right, *t);
}

// ---------------------------------------------------------------------------
// Sampler properties
// ---------------------------------------------------------------------------

proptest! {
    /// Every arrival after the very first lands in exactly one window: the
    /// counts over a sampler's lifetime sum to total events minus one.
    #[test]
    fn counts_conserve_all_but_the_first_event(
        loads in prop::collection::vec(0u64..30, 1..30),
    ) {
        let mut s = sampler_with(SamplerConfig::default());
        let mut t = Instant::now();
        let mut counted = 0u64;
        for &events in &loads {
            counted += feed(&mut s, &mut t, events).count;
        }
        let total: u64 = loads.iter().sum();
        prop_assert_eq!(counted, total.saturating_sub(1));
    }

    /// The first two closes are never scored, the third always is, no matter
    /// what the traffic looks like.
    #[test]
    fn scoring_starts_exactly_at_the_third_window(
        loads in prop::collection::vec(0u64..50, 3..10),
    ) {
        let mut s = sampler_with(SamplerConfig::default());
        let mut t = Instant::now();
        for (i, &events) in loads.iter().enumerate() {
            let report = feed(&mut s, &mut t, events);
            prop_assert_eq!(report.score.is_some(), i >= 2);
        }
    }

    /// The aggregate is always the mean of the most recent `score_cap`
    /// scores, and exactly `0.0` before any score exists.
    #[test]
    fn aggregate_tracks_the_recent_score_mean(
        cap in 1usize..8,
        loads in prop::collection::vec(0u64..40, 0..25),
    ) {
        let cfg = SamplerConfig::default().score_cap(cap);
        let mut s = sampler_with(cfg);
        let mut t = Instant::now();
        let mut scores: Vec<f64> = Vec::new();
        for &events in &loads {
            let report = feed(&mut s, &mut t, events);
            if let Some(score) = report.score {
                scores.push(score);
            }
            let recent = &scores[scores.len().saturating_sub(cap)..];
            if recent.is_empty() {
                prop_assert_eq!(report.aggregate, 0.0);
            } else {
                let expected = recent.iter().sum::<f64>() / recent.len() as f64;
                prop_assert_eq!(report.aggregate, expected);
            }
        }
    }

    /// Scores are pure functions of the count sequence: replaying the same
    /// loads yields a bit-identical summary.
    #[test]
    fn samplers_are_deterministic_over_counts(
        loads in prop::collection::vec(0u64..40, 0..25),
    ) {
        let t0 = Instant::now();
        let mut a = sampler_with(SamplerConfig::default());
        let mut b = sampler_with(SamplerConfig::default());
        let (mut ta, mut tb) = (t0, t0);
        for &events in &loads {
            feed(&mut a, &mut ta, events);
            feed(&mut b, &mut tb, events);
        }
        prop_assert_eq!(a.summary(), b.summary());
    }
}

// ---------------------------------------------------------------------------
// Comparator properties
// ---------------------------------------------------------------------------

proptest! {
    /// A lead change is emitted exactly when the recorded leader moves, and
    /// always captures a strictly ordered pair of aggregates.
    #[test]
    fn lead_changes_mark_exactly_the_flips(
        steps in prop::collection::vec((any::<bool>(), 0u64..20), 1..50),
    ) {
        let mut c = battle();
        let mut t = Instant::now();
        for &(left, events) in &steps {
            let side = if left { Side::Left } else { Side::Right };
            let before = c.leader();
            let tick = feed_side(&mut c, &mut t, side, events);
            match tick.lead_change {
                Some(change) => {
                    prop_assert_ne!(before, Some(change.leader));
                    prop_assert_eq!(change.previous, before);
                    prop_assert_eq!(c.leader(), Some(change.leader));
                    prop_assert!(change.leader_aggregate > change.trailing_aggregate);
                }
                None => prop_assert_eq!(c.leader(), before),
            }
        }
    }

    /// After any close the recorded leader, if set, never trails: a strictly
    /// greater opposing aggregate would have flipped the lead on the spot.
    #[test]
    fn recorded_leader_never_trails(
        steps in prop::collection::vec((any::<bool>(), 0u64..20), 1..50),
    ) {
        let mut c = battle();
        let mut t = Instant::now();
        for &(left, events) in &steps {
            let side = if left { Side::Left } else { Side::Right };
            feed_side(&mut c, &mut t, side, events);
            if let Some(leader) = c.leader() {
                let lead = c.sampler(leader).aggregate();
                let trail = c.sampler(leader.other()).aggregate();
                prop_assert!(lead >= trail, "leader {lead} trails {trail}");
            }
        }
    }

    /// Identical flat traffic scores zero on both sides at every close, so
    /// every comparison ties and the leader is never set.
    #[test]
    fn mirrored_flat_battles_have_no_leader(
        level in 0u64..30,
        rounds in 0usize..20,
    ) {
        let mut c = battle();
        let mut t = Instant::now();
        seed_both(&mut c, &mut t);
        for _ in 0..rounds {
            let lt = feed_side(&mut c, &mut t, Side::Left, level);
            let rt = feed_side(&mut c, &mut t, Side::Right, level);
            prop_assert!(lt.lead_change.is_none());
            prop_assert!(rt.lead_change.is_none());
        }
        prop_assert_eq!(c.leader(), None);
    }

    /// Replaying the same interleaved feed gives a bit-identical battle.
    #[test]
    fn battles_are_deterministic(
        steps in prop::collection::vec((any::<bool>(), 0u64..20), 0..40),
    ) {
        let t0 = Instant::now();
        let mut a = battle();
        let mut b = battle();
        let (mut ta, mut tb) = (t0, t0);
        for &(left, events) in &steps {
            let side = if left { Side::Left } else { Side::Right };
            feed_side(&mut a, &mut ta, side, events);
            feed_side(&mut b, &mut tb, side, events);
        }
        prop_assert_eq!(a.summary(), b.summary());
    }
}
