//! Synthetic event sources (feature `sim`).
//!
//! Both sources here run a small generator thread that feeds a battle's sink
//! and winds down cleanly when closed, or on its own once the battle stops
//! and the sink disconnects.  [`PoissonSource`] draws exponential
//! inter-arrival gaps from a seeded generator; [`ScriptedSource`] replays an
//! exact delay schedule.  They exist so demos, wiring tests, and host
//! integration tests never need a real transport.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

use crate::{Error, EventSink, EventSource};

/// Generator-thread handle shared by the synthetic sources.
struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn shutdown(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

/// Poisson pulse stream: exponentially distributed inter-arrival gaps.
///
/// `rate_hz` is the expected number of events per second.  The generator is
/// seeded, so two sources with the same seed and rate draw the same gap
/// sequence; wall-clock jitter still applies to actual delivery times.
pub struct PoissonSource {
    rate_hz: f64,
    seed: u64,
    worker: Option<Worker>,
}

impl PoissonSource {
    pub fn new(rate_hz: f64, seed: u64) -> Self {
        Self {
            rate_hz,
            seed,
            worker: None,
        }
    }
}

impl EventSource for PoissonSource {
    fn open(&mut self, sink: EventSink) -> Result<(), Error> {
        if self.worker.is_some() {
            return Err(Error::Source("poisson source already open".into()));
        }
        // Exp::new accepts +inf, which would draw all-zero gaps.
        if !self.rate_hz.is_finite() || self.rate_hz <= 0.0 {
            return Err(Error::Domain("PoissonSource: rate_hz must be finite and positive"));
        }
        let gaps = Exp::new(self.rate_hz)
            .map_err(|_| Error::Domain("PoissonSource: rate_hz must be finite and positive"))?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("faceoff-poisson".into())
            .spawn(move || loop {
                let gap_s: f64 = gaps.sample(&mut rng);
                // One draw never sleeps longer than a day.
                let gap = Duration::from_secs_f64(gap_s.min(86_400.0));
                match stop_rx.recv_timeout(gap) {
                    Err(RecvTimeoutError::Timeout) => {
                        if sink.send(()).is_err() {
                            break; // battle stopped; the sink is gone
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| Error::Source(format!("failed to spawn generator thread: {e}")))?;
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(w) = self.worker.take() {
            w.shutdown();
        }
    }
}

/// Replays a fixed schedule of inter-pulse delays, then goes quiet.
///
/// Handy for wiring tests: the pulse count and pacing are known in advance.
/// Each delay is the gap (in milliseconds) before the next pulse.  Once the
/// schedule is exhausted the generator exits and drops its sink; from the
/// battle's point of view the stream simply has no further events.
pub struct ScriptedSource {
    delays_ms: Vec<u64>,
    worker: Option<Worker>,
}

impl ScriptedSource {
    pub fn new(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            worker: None,
        }
    }

    /// A schedule of `pulses` gaps of `delay_ms` each.
    pub fn steady(delay_ms: u64, pulses: usize) -> Self {
        Self::new(vec![delay_ms; pulses])
    }
}

impl EventSource for ScriptedSource {
    fn open(&mut self, sink: EventSink) -> Result<(), Error> {
        if self.worker.is_some() {
            return Err(Error::Source("scripted source already open".into()));
        }
        let delays = self.delays_ms.clone();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("faceoff-scripted".into())
            .spawn(move || {
                for delay_ms in delays {
                    match stop_rx.recv_timeout(Duration::from_millis(delay_ms)) {
                        Err(RecvTimeoutError::Timeout) => {
                            if sink.send(()).is_err() {
                                return;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            })
            .map_err(|e| Error::Source(format!("failed to spawn generator thread: {e}")))?;
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(w) = self.worker.take() {
            w.shutdown();
        }
    }
}
