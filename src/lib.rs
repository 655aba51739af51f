//! `faceoff`: which of two live event streams is more abnormally active right now?
//!
//! Two contenders each emit an irregular stream of events: messages, trades,
//! mentions, anything where only the arrival moment matters.  `faceoff`
//! buckets each stream into fixed windows (default 1000 ms), scores every new
//! window count as a z-score against that stream's own full per-window
//! history, smooths the most recent K=20 scores into an aggregate, and
//! reports a winner change exactly when the lead flips between sides.
//!
//! Normalizing each stream against its own history is what makes the
//! comparison fair: a firehose that always does 50 events per second is not
//! "more active than usual", while a trickle that jumps from 2 to 10 very
//! much is.  Absolute rates never cross sides; only each side's deviation
//! from its own baseline does.
//!
//! **Goals:**
//! - **Deterministic core**: [`Sampler`] and [`Comparator`] never read the
//!   clock and never spawn threads.  Callers feed arrival timestamps and
//!   window-close ticks; typed reports come back.  Same inputs → same
//!   outputs, so every numeric property is unit-testable.
//! - **Self-normalizing**: the baseline is the stream's entire per-window
//!   count history, not a truncated window; "usual" means "usual for this
//!   stream over this battle".
//! - **Flip-edge events**: [`LeadChange`] fires on actual lead flips only —
//!   never on ties, never redundantly while the same side stays ahead.
//! - **Thin live layer**: [`Battle`] owns the sources, the per-side window
//!   clocks, and the single driver thread; everything it drives is the pure
//!   core.
//!
//! **Scoring pipeline, per side, per window close:**
//! 1. The window's `count` is the number of inter-arrival deltas bucketed
//!    since the previous close; the bucket is cleared.
//! 2. With fewer than two baseline windows, scoring is skipped (the baseline
//!    is not yet meaningful).
//! 3. Otherwise `score = (count - mean) / population_std_dev` over the whole
//!    baseline, where a zero deviation scores exactly `0.0`, so a flat
//!    history never yields NaN or an infinite score.
//! 4. The score joins the sliding [`ScoreWindow`]; the side's aggregate is
//!    that window's mean.
//! 5. `count` joins the baseline *after* scoring, so a window never scores
//!    against itself.
//!
//! The count is the number of *gaps* closed inside the window: the first
//! event a stream ever delivers opens a gap without closing one, so a
//! stream's first active window reads one lower than its raw event count.
//! Consumers of the per-window counts rely on this convention; it is kept,
//! not corrected.
//!
//! **Non-goals:** no persistence across battles, no payload semantics, no
//! reconnection, no compensation for streams that go quiet for long
//! stretches.  Transport specifics belong to [`EventSource`] implementors.
//!
//! # Quick start (deterministic)
//!
//! ```
//! use faceoff::{Comparator, Contender, Sampler, SamplerConfig, Side};
//! use std::time::{Duration, Instant};
//!
//! let cfg = SamplerConfig::default();
//! let left = Sampler::new(Contender::new("rs", "Rust"), Side::Left, cfg.clone()).unwrap();
//! let right = Sampler::new(Contender::new("go", "Go"), Side::Right, cfg).unwrap();
//! let mut battle = Comparator::new(left, right).unwrap();
//!
//! // Feed arrivals, then close windows on your own clock.
//! let t0 = Instant::now();
//! for i in 0..5u64 {
//!     battle.record_event(Side::Left, t0 + Duration::from_millis(i * 40));
//! }
//! let tick = battle.close_window(Side::Left);
//! assert_eq!(tick.report.count, 4); // five arrivals close four gaps
//! assert!(tick.report.score.is_none()); // baseline still warming up
//! ```
//!
//! For live wiring (sources, timers, observer callbacks) see [`Battle`];
//! for synthetic streams see the [`sim`] module (feature `sim`).

#![forbid(unsafe_code)]

use std::collections::VecDeque;

mod error;
pub use error::*;

mod sampler;
pub use sampler::*;

mod comparator;
pub use comparator::*;

mod clock;
pub use clock::*;

mod source;
pub use source::*;

mod battle;
pub use battle::*;

#[cfg(feature = "sim")]
pub mod sim;

pub const FACEOFF_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One of the two fixed battle positions.
///
/// Sides identify the samplers of a [`Comparator`]; they carry no meaning
/// beyond identity (neither side is preferred by the comparison).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Identity of one competing entity: an opaque key plus a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contender {
    /// Opaque key hosts use to correlate reports with their own state
    /// (a language code, a ticker symbol, a channel id).
    pub key: String,
    /// Human-readable label for display.
    pub label: String,
}

impl Contender {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Unweighted arithmetic mean of a count history; `0.0` for an empty slice.
pub fn mean(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().map(|&c| c as f64).sum::<f64>() / counts.len() as f64
}

/// Population standard deviation of a count history (divides by N, not N−1);
/// `0.0` for an empty slice.
pub fn population_std_dev(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let m = mean(counts);
    let var = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - m;
            d * d
        })
        .sum::<f64>()
        / counts.len() as f64;
    var.sqrt()
}

/// Z-score of `value` against a baseline mean and standard deviation.
///
/// A zero deviation yields exactly `0.0` whatever `value` is: a perfectly
/// flat history makes every new observation "as usual", never NaN.
pub fn zscore(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (value - mean) / std_dev
    }
}

/// Strict-FIFO sliding window over the most recent normalized scores.
///
/// Pushing past capacity evicts exactly the oldest entry.  The window's mean
/// is a side's aggregate activity score; it is `0.0` while empty, so a side
/// with no scored windows yet compares as exactly neutral.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWindow {
    cap: usize,
    buf: VecDeque<f64>,
}

impl ScoreWindow {
    /// Create an empty window with capacity `cap` (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            buf: VecDeque::new(),
        }
    }

    /// Maximum number of scores retained.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of scores currently retained.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no score has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Iterate over retained scores, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }

    /// Push a score, evicting the oldest if at capacity.
    pub fn push(&mut self, score: f64) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(score);
    }

    /// Arithmetic mean of the retained scores; `0.0` while empty.
    pub fn mean(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        self.buf.iter().sum::<f64>() / self.buf.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mean_of_empty_history_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn mean_and_std_dev_match_documented_vector() {
        // counts [4, 6, 5, 5]: mean 5, squared deviations 1+1+0+0 over 4.
        let counts = [4u64, 6, 5, 5];
        assert_eq!(mean(&counts), 5.0);
        let sd = population_std_dev(&counts);
        assert!((sd - 0.5f64.sqrt()).abs() < 1e-12);
        // A new count of 9 lands four deviations above: (9-5)/√0.5 ≈ 5.657.
        let score = zscore(9.0, 5.0, sd);
        assert!((score - 5.656_854_249_492_38).abs() < 1e-9);
    }

    #[test]
    fn std_dev_divides_by_n_not_n_minus_1() {
        // Sample (N−1) deviation for [4, 6] would be √2; population is 1.
        assert_eq!(population_std_dev(&[4, 6]), 1.0);
    }

    #[test]
    fn zscore_with_zero_deviation_is_exactly_zero() {
        assert_eq!(zscore(16.0, 10.0, 0.0), 0.0);
        assert_eq!(zscore(-3.0, 0.0, 0.0), 0.0);
        assert!(!zscore(16.0, 10.0, 0.0).is_nan());
    }

    #[test]
    fn score_window_evicts_oldest_past_capacity() {
        let mut w = ScoreWindow::new(3);
        for s in [1.0, 2.0, 3.0] {
            w.push(s);
        }
        assert_eq!(w.len(), 3);
        w.push(4.0);
        assert_eq!(w.len(), 3);
        let kept: Vec<f64> = w.iter().collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn score_window_mean_tracks_retained_scores_only() {
        let mut w = ScoreWindow::new(2);
        assert_eq!(w.mean(), 0.0);
        w.push(1.0);
        assert_eq!(w.mean(), 1.0);
        w.push(3.0);
        assert_eq!(w.mean(), 2.0);
        w.push(5.0); // evicts 1.0
        assert_eq!(w.mean(), 4.0);
    }

    #[test]
    fn score_window_cap_is_clamped_to_one() {
        let mut w = ScoreWindow::new(0);
        assert_eq!(w.cap(), 1);
        w.push(7.0);
        w.push(9.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w.mean(), 9.0);
    }

    proptest! {
        #[test]
        fn score_window_never_exceeds_cap_and_mean_matches_tail(
            scores in prop::collection::vec(-100.0f64..100.0, 0..60),
            cap in 1usize..25,
        ) {
            let mut w = ScoreWindow::new(cap);
            for &s in &scores {
                w.push(s);
            }
            prop_assert_eq!(w.len(), scores.len().min(cap));
            let tail_start = scores.len().saturating_sub(cap);
            let tail = &scores[tail_start..];
            if tail.is_empty() {
                prop_assert_eq!(w.mean(), 0.0);
            } else {
                let expected = tail.iter().sum::<f64>() / tail.len() as f64;
                prop_assert!((w.mean() - expected).abs() < 1e-9);
            }
        }

        #[test]
        fn population_std_dev_matches_moment_formula(
            counts in prop::collection::vec(0u64..1_000, 1..50),
        ) {
            let m = mean(&counts);
            let m2 = counts.iter().map(|&c| (c as f64) * (c as f64)).sum::<f64>()
                / counts.len() as f64;
            let var = (m2 - m * m).max(0.0);
            prop_assert!((population_std_dev(&counts) - var.sqrt()).abs() < 1e-6);
        }
    }
}
