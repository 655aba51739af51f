//! Per-stream sampling: arrival bucketing, baseline history, scoring.
//!
//! A [`Sampler`] turns an irregular arrival stream into one number per
//! window ("how unusual was this window for this stream") via the pipeline
//! described at the crate root.  It holds three buffers with very different
//! lifetimes: the transient delta bucket (cleared every close), the unbounded
//! per-window count baseline (the whole battle's history), and the sliding
//! score window behind the aggregate.

use std::time::Instant;

use crate::{mean, population_std_dev, zscore, Contender, Error, ScoreWindow, Side};

/// Tuning for one [`Sampler`].
///
/// The defaults are the intended production values: one-second windows and a
/// twenty-score smoothing span.  Tests shrink both to drive scenarios fast.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerConfig {
    /// Window period in milliseconds; every close covers one period.
    pub window_ms: u64,
    /// Capacity of the sliding score window (the aggregate's smoothing span).
    pub score_cap: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            score_cap: 20,
        }
    }
}

impl SamplerConfig {
    /// Set the window period in milliseconds.
    pub fn window_ms(mut self, ms: u64) -> Self {
        self.window_ms = ms;
        self
    }

    /// Set the score-window capacity.
    pub fn score_cap(mut self, cap: usize) -> Self {
        self.score_cap = cap;
        self
    }
}

/// One closed window, as reported to observers.
///
/// Carries the new-count notification plus the scoring context an audit log
/// wants alongside it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowReport {
    /// Which side closed the window.
    pub side: Side,
    /// Zero-based index of the window within this sampler's lifetime.
    pub window_index: u64,
    /// Number of inter-arrival deltas bucketed in the window.
    pub count: u64,
    /// The window's normalized score, or `None` while the baseline still has
    /// fewer than two entries.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub score: Option<f64>,
    /// Mean of the sliding score window after this close.
    pub aggregate: f64,
}

/// Point-in-time view of one sampler, for polling between callbacks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideSummary {
    /// Contender key.
    pub key: String,
    /// Contender display label.
    pub label: String,
    /// Battle side.
    pub side: Side,
    /// Windows closed so far.
    pub windows: u64,
    /// Count of the most recently closed window, or `None` before the first
    /// close.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub last_count: Option<u64>,
    /// Current aggregate score.
    pub aggregate: f64,
    /// Mean of the full baseline history (`0.0` while empty).
    pub baseline_mean: f64,
    /// Population standard deviation of the baseline (`0.0` while empty).
    pub baseline_std_dev: f64,
}

/// Per-stream state machine: buckets arrivals, maintains the baseline, and
/// scores each closed window against the stream's own history.
///
/// A `Sampler` never reads the clock.  Its owner feeds arrival timestamps
/// through [`record_event`](Sampler::record_event) and drives the window
/// cycle through [`close_window`](Sampler::close_window); live scheduling
/// belongs to [`Battle`](crate::Battle).  Because event handling and window
/// closes are plain sequential method calls, an arrival is bucketed entirely
/// before or entirely after any given close — never split across one.
#[derive(Debug, Clone)]
pub struct Sampler {
    contender: Contender,
    side: Side,
    cfg: SamplerConfig,
    bucket: Vec<u64>,
    prev_arrival: Option<Instant>,
    window_counts: Vec<u64>,
    scores: ScoreWindow,
    last_count: Option<u64>,
}

impl Sampler {
    /// Create a sampler for one contender on one side.
    ///
    /// Returns a domain error if `window_ms` or `score_cap` is zero.
    pub fn new(contender: Contender, side: Side, cfg: SamplerConfig) -> Result<Self, Error> {
        if cfg.window_ms == 0 {
            return Err(Error::Domain("SamplerConfig: window_ms must be positive"));
        }
        if cfg.score_cap == 0 {
            return Err(Error::Domain("SamplerConfig: score_cap must be positive"));
        }
        let scores = ScoreWindow::new(cfg.score_cap);
        Ok(Self {
            contender,
            side,
            cfg,
            bucket: Vec::new(),
            prev_arrival: None,
            window_counts: Vec::new(),
            scores,
            last_count: None,
        })
    }

    /// Record one event arrival.
    ///
    /// The delta to the previous arrival (in milliseconds, saturating at
    /// zero) joins the current bucket.  The very first arrival in the
    /// sampler's lifetime only opens the gap sequence and buckets nothing,
    /// which is why a stream's first active window counts one low.
    pub fn record_event(&mut self, at: Instant) {
        if let Some(prev) = self.prev_arrival {
            let delta_ms = at.saturating_duration_since(prev).as_millis() as u64;
            self.bucket.push(delta_ms);
        }
        self.prev_arrival = Some(at);
    }

    /// Close the current window and score it.
    ///
    /// The bucket length becomes the window's count and the bucket is
    /// cleared.  Once at least two baseline windows exist the count is
    /// scored as a z-score against the whole history (population deviation;
    /// a flat history scores exactly `0.0`), the score joins the sliding
    /// window, and the aggregate refreshes.  The count enters the baseline
    /// only after scoring, so a window never scores against itself.
    ///
    /// This runs unconditionally: thin baselines and empty windows still
    /// produce a report and still extend the baseline by exactly one entry.
    pub fn close_window(&mut self) -> WindowReport {
        let count = self.bucket.len() as u64;
        self.bucket.clear();

        let score = if self.window_counts.len() < 2 {
            None
        } else {
            let avg = mean(&self.window_counts);
            let sd = population_std_dev(&self.window_counts);
            Some(zscore(count as f64, avg, sd))
        };
        if let Some(s) = score {
            self.scores.push(s);
        }

        let window_index = self.window_counts.len() as u64;
        self.window_counts.push(count);
        self.last_count = Some(count);

        WindowReport {
            side: self.side,
            window_index,
            count,
            score,
            aggregate: self.scores.mean(),
        }
    }

    /// Contender identity.
    pub fn contender(&self) -> &Contender {
        &self.contender
    }

    /// Battle side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Active configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    /// Current aggregate score: mean of the sliding score window, `0.0`
    /// before any window has been scored.
    pub fn aggregate(&self) -> f64 {
        self.scores.mean()
    }

    /// Number of windows closed so far.
    pub fn windows_closed(&self) -> u64 {
        self.window_counts.len() as u64
    }

    /// Full baseline of per-window counts, oldest first.
    pub fn baseline(&self) -> &[u64] {
        &self.window_counts
    }

    /// Number of deltas bucketed since the last close (the pending count).
    pub fn bucket_len(&self) -> usize {
        self.bucket.len()
    }

    /// Point-in-time summary for display and polling.
    pub fn summary(&self) -> SideSummary {
        SideSummary {
            key: self.contender.key.clone(),
            label: self.contender.label.clone(),
            side: self.side,
            windows: self.windows_closed(),
            last_count: self.last_count,
            aggregate: self.aggregate(),
            baseline_mean: mean(&self.window_counts),
            baseline_std_dev: population_std_dev(&self.window_counts),
        }
    }
}
