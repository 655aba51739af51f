//! Live battle wiring: sources, window clocks, and the driver thread.
//!
//! Everything stateful about a running battle happens on one driver thread:
//! pulses are stamped and bucketed, due windows are closed, and observer
//! callbacks run to completion before the next event is handled.  Nothing is
//! locked because nothing is shared: the comparator moves into the driver
//! at start, and the only traffic across threads is channel messages.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, never, select, unbounded, Receiver, Sender};

use crate::{
    BattleSummary, Comparator, Error, EventSource, LeadChange, Side, WindowClock, WindowReport,
};

/// Receives battle notifications on the driver thread.
///
/// Callbacks run synchronously inside the driver loop: a slow observer
/// delays window closes (they are never dropped or overlapped).  Per window
/// close, [`on_new_count`](BattleObserver::on_new_count) always fires first;
/// [`on_lead_change`](BattleObserver::on_lead_change) follows only when that
/// close flipped the lead.
pub trait BattleObserver: Send {
    /// One window closed on one side.
    fn on_new_count(&mut self, report: &WindowReport);

    /// The lead flipped.
    fn on_lead_change(&mut self, change: &LeadChange);
}

/// A runnable (then running, then stopped) two-sided battle.
///
/// `Battle` owns the live half of the system: the two [`EventSource`]s, the
/// per-side [`WindowClock`]s, and the driver thread that feeds the pure
/// [`Comparator`].  Build one per pairing; a stopped battle stays stopped,
/// and a new pairing gets a new battle.
///
/// Dropping a running battle also winds the driver down (its stop channel
/// disconnects), but [`stop`](Battle::stop) is the orderly path: it joins
/// the driver and closes both sources before returning.
pub struct Battle {
    comparator: Option<Comparator>,
    observer: Option<Box<dyn BattleObserver>>,
    left_source: Box<dyn EventSource>,
    right_source: Box<dyn EventSource>,
    stop_tx: Option<Sender<()>>,
    driver: Option<JoinHandle<(Comparator, Box<dyn BattleObserver>)>>,
    stopped: bool,
}

impl Battle {
    /// Wire a comparator to its two sources and an observer.
    pub fn new(
        comparator: Comparator,
        left_source: Box<dyn EventSource>,
        right_source: Box<dyn EventSource>,
        observer: Box<dyn BattleObserver>,
    ) -> Self {
        Self {
            comparator: Some(comparator),
            observer: Some(observer),
            left_source,
            right_source,
            stop_tx: None,
            driver: None,
            stopped: false,
        }
    }

    /// Open both sources and start the driver thread.
    ///
    /// Each side's first window close lands one full period after this call.
    /// A source that fails to open aborts the start — the already-open
    /// source is closed again, the error surfaces, and the battle remains
    /// startable.  Starting a running or stopped battle is an error.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.driver.is_some() || self.stopped {
            return Err(Error::AlreadyStarted);
        }
        let Some(comparator) = self.comparator.take() else {
            return Err(Error::AlreadyStarted);
        };
        let Some(observer) = self.observer.take() else {
            self.comparator = Some(comparator);
            return Err(Error::AlreadyStarted);
        };

        let (left_tx, left_rx) = unbounded();
        if let Err(e) = self.left_source.open(left_tx) {
            self.comparator = Some(comparator);
            self.observer = Some(observer);
            return Err(e);
        }
        let (right_tx, right_rx) = unbounded();
        if let Err(e) = self.right_source.open(right_tx) {
            self.left_source.close();
            self.comparator = Some(comparator);
            self.observer = Some(observer);
            return Err(e);
        }

        let left_period = Duration::from_millis(comparator.sampler(Side::Left).config().window_ms);
        let right_period =
            Duration::from_millis(comparator.sampler(Side::Right).config().window_ms);
        let (stop_tx, stop_rx) = bounded(1);
        let spawned = thread::Builder::new().name("faceoff-driver".into()).spawn(
            move || drive(comparator, observer, left_rx, right_rx, stop_rx, left_period, right_period),
        );
        match spawned {
            Ok(handle) => {
                self.stop_tx = Some(stop_tx);
                self.driver = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.left_source.close();
                self.right_source.close();
                self.stopped = true;
                Err(Error::Source(format!("failed to spawn driver thread: {e}")))
            }
        }
    }

    /// Stop the battle: signal the driver, join it, close both sources.
    ///
    /// Idempotent: later calls (and calls before any start) are no-ops.
    /// Once `stop` returns no observer callback fires again, and pulses
    /// still in flight go nowhere.
    pub fn stop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        self.stopped = true;
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Ok((comparator, observer)) = driver.join() {
            self.comparator = Some(comparator);
            self.observer = Some(observer);
        }
        self.left_source.close();
        self.right_source.close();
    }

    /// Whether the driver thread is currently running.
    pub fn is_running(&self) -> bool {
        self.driver.is_some()
    }

    /// Both sides' summaries and the recorded leader.
    ///
    /// Available before `start` and after `stop`.  While the battle runs
    /// the state lives with the driver thread and observer callbacks are
    /// the window in, so this returns `None`.
    pub fn summary(&self) -> Option<BattleSummary> {
        self.comparator.as_ref().map(Comparator::summary)
    }
}

fn drive(
    mut comparator: Comparator,
    mut observer: Box<dyn BattleObserver>,
    mut left_rx: Receiver<()>,
    mut right_rx: Receiver<()>,
    stop_rx: Receiver<()>,
    left_period: Duration,
    right_period: Duration,
) -> (Comparator, Box<dyn BattleObserver>) {
    let start = Instant::now();
    let mut left_clock = WindowClock::new(left_period, start);
    let mut right_clock = WindowClock::new(right_period, start);
    let mut left_gone = false;
    let mut right_gone = false;

    loop {
        // Close one due window per pass, re-arming its clock from the
        // completion time so closes chain rather than pile up.
        let now = Instant::now();
        if left_clock.due(now) {
            emit(&mut comparator, observer.as_mut(), Side::Left);
            left_clock.rearm(Instant::now());
            continue;
        }
        if right_clock.due(now) {
            emit(&mut comparator, observer.as_mut(), Side::Right);
            right_clock.rearm(Instant::now());
            continue;
        }

        let wait = left_clock.remaining(now).min(right_clock.remaining(now));
        select! {
            recv(left_rx) -> msg => match msg {
                Ok(()) => comparator.record_event(Side::Left, Instant::now()),
                Err(_) => left_gone = true,
            },
            recv(right_rx) -> msg => match msg {
                Ok(()) => comparator.record_event(Side::Right, Instant::now()),
                Err(_) => right_gone = true,
            },
            recv(stop_rx) -> _ => break,
            default(wait) => {}
        }

        // A disconnected source is just a stream with no more events; swap
        // in a silent receiver and keep ticking on the clocks.
        if left_gone {
            left_gone = false;
            left_rx = never();
        }
        if right_gone {
            right_gone = false;
            right_rx = never();
        }
    }

    (comparator, observer)
}

fn emit(comparator: &mut Comparator, observer: &mut dyn BattleObserver, side: Side) {
    let outcome = comparator.close_window(side);
    observer.on_new_count(&outcome.report);
    if let Some(change) = outcome.lead_change {
        observer.on_lead_change(&change);
    }
}
