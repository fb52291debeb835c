//! Error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Tick subscription errors.
///
/// These are programmer errors: an interval the divider cannot represent, or
/// a divider that has already been shut down.
#[derive(Debug, Error)]
pub enum TickError {
    /// The interval is not a multiple of the base tick (strict policy only).
    #[error("tick interval {interval:?} is not a multiple of the base interval {base:?}")]
    NotMultiple {
        /// Requested interval.
        interval: Duration,
        /// Divider base interval.
        base: Duration,
    },

    /// The divider was stopped.
    #[error("tick divider is stopped")]
    Stopped,
}

/// Errors that end the whole bar.
#[derive(Debug, Error)]
pub enum BarError {
    /// Writing to the output stream failed. There is no degraded mode.
    #[error("output stream failed: {0}")]
    Output(#[source] io::Error),

    /// Reading the inbound event stream failed.
    #[error("input stream failed: {0}")]
    Input(#[source] io::Error),

    /// The inbound event stream reached end of file.
    #[error("input stream closed")]
    InputClosed,

    /// Registering the stop/continue signal handlers failed.
    #[error("failed to register signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// A worker thread could not be spawned.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// OS error.
        #[source]
        source: io::Error,
    },
}
