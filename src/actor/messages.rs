//! Message types for actor communication.
//!
//! Instances never talk to the aggregator directly; they only poke one of two
//! single-slot channels. A full slot already means "flush soon", so extra
//! signals are dropped.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::BarError;

/// How soon a changed instance wants its output flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// Wait for the debounce window so bursts coalesce.
    Debounced,
    /// Flush right away, e.g. in response to a click.
    Immediate,
}

impl Invalidation {
    /// Map the `now` flag of [`Instance::update`](crate::Instance::update).
    pub const fn from_now(now: bool) -> Self {
        if now {
            Self::Immediate
        } else {
            Self::Debounced
        }
    }
}

/// Commands sent to the aggregator from outside the render path.
#[derive(Debug)]
pub enum Control {
    /// Stop the main loop and return normally.
    Shutdown,
    /// A collaborator failed in a way that ends the bar.
    Fatal(BarError),
}

/// Sending half of the invalidation channels, shared by all instances.
#[derive(Debug, Clone)]
pub struct Invalidator {
    debounced: Sender<()>,
    immediate: Sender<()>,
}

/// Receiving half of the invalidation channels, owned by the aggregator.
#[derive(Debug)]
pub struct Invalidations {
    /// Normal invalidations.
    pub debounced: Receiver<()>,
    /// Immediate invalidations.
    pub immediate: Receiver<()>,
}

impl Invalidations {
    /// Discard pending signals. Returns whether any were pending.
    pub fn drain(&self) -> bool {
        let debounced = self.debounced.try_recv().is_ok();
        let immediate = self.immediate.try_recv().is_ok();
        debounced || immediate
    }
}

/// Create a connected invalidator pair.
pub fn invalidation_channel() -> (Invalidator, Invalidations) {
    let (debounced, debounced_rx) = bounded(1);
    let (immediate, immediate_rx) = bounded(1);
    (
        Invalidator {
            debounced,
            immediate,
        },
        Invalidations {
            debounced: debounced_rx,
            immediate: immediate_rx,
        },
    )
}

impl Invalidator {
    /// Request a flush. Never blocks.
    pub fn invalidate(&self, kind: Invalidation) {
        let tx = match kind {
            Invalidation::Debounced => &self.debounced,
            Invalidation::Immediate => &self.immediate,
        };
        let _ = tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_coalesce() {
        let (tx, rx) = invalidation_channel();
        tx.invalidate(Invalidation::Debounced);
        tx.invalidate(Invalidation::Debounced);
        tx.invalidate(Invalidation::Immediate);

        assert_eq!(rx.debounced.len(), 1);
        assert_eq!(rx.immediate.len(), 1);
        assert!(rx.drain());
        assert!(!rx.drain());
    }

    #[test]
    fn test_from_now() {
        assert_eq!(Invalidation::from_now(true), Invalidation::Immediate);
        assert_eq!(Invalidation::from_now(false), Invalidation::Debounced);
    }
}
