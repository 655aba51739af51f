//! Crate error type.
//!
//! Errors are reserved for construction and lifecycle misuse, where the
//! caller can actually fix something. Anomalies inside the scoring pipeline
//! never surface here: degenerate statistics degrade to benign values
//! (skipped scores, an exact zero) so the window cycle keeps running under
//! all data conditions.

/// Errors surfaced by constructors and lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration or argument value is outside its valid domain.
    #[error("domain error: {0}")]
    Domain(&'static str),

    /// `start` was called on a battle that is already running or has
    /// already run once. Battles are single-shot; build a new one.
    #[error("battle already started")]
    AlreadyStarted,

    /// A stream source failed to open or the live layer could not come up.
    #[error("source error: {0}")]
    Source(String),
}
