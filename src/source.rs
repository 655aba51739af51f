//! The stream-source collaborator contract.

use crossbeam_channel::Sender;

use crate::Error;

/// Where sources deliver pulses: one `()` send per observed event.
///
/// Payloads never cross this boundary; the driver stamps arrival time on
/// receipt, so a pulse carries no data at all.  A disconnected sink means
/// the battle is over; sources should treat a failed send as a stop signal,
/// not an error.
pub type EventSink = Sender<()>;

/// A push-based event stream feeding one side of a battle.
///
/// Implementations own all transport specifics: sockets, subscriptions,
/// replay files.  The contract is narrow: [`open`](EventSource::open) begins
/// delivering one pulse per event into the sink, [`close`](EventSource::close)
/// stops delivery and is safe to call repeatedly or before `open`.
/// Reconnection and recovery policy belong to the implementor; the battle
/// treats a source that goes quiet as a stream with no events.
pub trait EventSource {
    /// Begin delivering pulses into `sink`.
    ///
    /// Called once per battle, from [`Battle::start`](crate::Battle::start);
    /// an error here aborts the start and surfaces to the caller.
    fn open(&mut self, sink: EventSink) -> Result<(), Error>;

    /// Stop delivering pulses.  Idempotent.
    fn close(&mut self);
}
