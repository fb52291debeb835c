//! Instance: the scheduler-side handle for one module.
//!
//! # Buffers
//!
//! Each instance keeps two serialized render buffers:
//!
//! - **draft**: rebuilt from scratch by every [`Instance::update`] call
//! - **committed**: the last complete render, read by the aggregator
//!
//! After the callback returns, the buffers are swapped under the committed
//! lock and compared byte for byte. Only a real change invalidates the bar.
//! The two buffers have separate locks so a slow render callback never holds
//! up a flush of already-committed output.

mod render;

pub use render::{error_block, Renderer};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::actor::{Invalidation, Invalidator};
use crate::error::TickError;
use crate::protocol::Event;
use crate::tick::{Subscription, TickDivider};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runtime handle binding one module to the bar.
///
/// Outlives module restarts; only the tick subscription is torn down when the
/// module faults.
pub struct Instance {
    /// Correlation id, stamped into blocks and matched against events.
    name: String,
    invalidator: Invalidator,
    divider: Arc<TickDivider>,
    ticker: Mutex<Option<Subscription>>,

    tick_tx: Sender<()>,
    tick_rx: Receiver<()>,
    event_tx: Sender<Event>,
    event_rx: Receiver<Event>,
    stopped_tx: Sender<()>,
    stopped_rx: Receiver<()>,

    stopped: AtomicBool,

    draft: Mutex<Vec<u8>>,
    committed: Mutex<Vec<u8>>,
}

impl Instance {
    pub(crate) fn new(
        name: String,
        event_capacity: usize,
        divider: Arc<TickDivider>,
        invalidator: Invalidator,
    ) -> Self {
        let (tick_tx, tick_rx) = bounded(1);
        let (event_tx, event_rx) = bounded(event_capacity.max(1));
        let (stopped_tx, stopped_rx) = bounded(1);

        Self {
            name,
            invalidator,
            divider,
            ticker: Mutex::new(None),
            tick_tx,
            tick_rx,
            event_tx,
            event_rx,
            stopped_tx,
            stopped_rx,
            stopped: AtomicBool::new(false),
            draft: Mutex::new(Vec::with_capacity(256)),
            committed: Mutex::new(Vec::with_capacity(256)),
        }
    }

    /// Deliver ticks on [`Instance::ticked`] every `interval`.
    ///
    /// Intervals are quantized to the bar's base tick, so modules asking for
    /// related intervals tick together. A zero interval disables ticks.
    /// Calling this again changes the interval in place.
    pub fn tick(&self, interval: Duration) -> Result<(), TickError> {
        let mut ticker = lock(&self.ticker);
        if let Some(sub) = ticker.as_ref() {
            return sub.reset(interval);
        }
        let sub = self
            .divider
            .attach(self.tick_tx.clone(), self.tick_rx.clone(), interval)?;
        *ticker = Some(sub);
        Ok(())
    }

    /// Build and submit this module's output.
    ///
    /// The renderer is only valid inside `render`. If the result differs from
    /// the committed output, the bar is invalidated; `now` skips the debounce
    /// window.
    pub fn update<F>(&self, now: bool, render: F)
    where
        F: FnOnce(&mut Renderer<'_>),
    {
        let mut draft = lock(&self.draft);
        draft.clear();
        render(&mut Renderer::new(&self.name, &mut draft));

        let mut committed = lock(&self.committed);
        std::mem::swap(&mut *draft, &mut *committed);
        let changed = *draft != *committed;
        drop(committed);
        drop(draft);

        if changed {
            self.invalidator.invalidate(Invalidation::from_now(now));
        }
    }

    /// Whether the host has paused the bar. Advisory only.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Click events addressed to this instance. Up to the configured capacity
    /// (16 by default) are buffered; later ones are dropped.
    #[inline]
    pub const fn event(&self) -> &Receiver<Event> {
        &self.event_rx
    }

    /// Notified when [`Instance::is_stopped`] may have changed.
    #[inline]
    pub const fn stopped(&self) -> &Receiver<()> {
        &self.stopped_rx
    }

    /// Notified at the interval set with [`Instance::tick`].
    #[inline]
    pub const fn ticked(&self) -> &Receiver<()> {
        &self.tick_rx
    }

    /// Write a debug message tagged with this instance.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(instance = %self.name, "{args}");
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Queue an event if it is addressed to us. Returns whether it matched.
    pub(crate) fn send_event(&self, event: &Event) -> bool {
        if event.name != self.name {
            return false;
        }
        if let Err(TrySendError::Full(_)) = self.event_tx.try_send(event.clone()) {
            tracing::debug!(instance = %self.name, "event queue full, dropping click");
        }
        true
    }

    pub(crate) fn set_stopped(&self, stopped: bool) {
        self.stopped.store(stopped, Ordering::Release);
        let _ = self.stopped_tx.try_send(());
    }

    /// Remove the tick subscription.
    pub(crate) fn halt_ticks(&self) {
        lock(&self.ticker).take();
    }

    /// Discard buffered events and ticks.
    pub(crate) fn drain(&self) {
        while self.event_rx.try_recv().is_ok() {}
        while self.tick_rx.try_recv().is_ok() {}
    }

    /// Block until the next event.
    pub(crate) fn wait_event(&self) -> Option<Event> {
        self.event_rx.recv().ok()
    }

    /// Append the committed blocks to a frame.
    ///
    /// `comma` says whether a previous instance wrote something; the return
    /// value says whether the next one needs a comma.
    pub(crate) fn write_to(&self, frame: &mut Vec<u8>, comma: bool) -> bool {
        let committed = lock(&self.committed);
        if committed.len() <= 1 {
            return comma;
        }
        if comma {
            frame.extend_from_slice(&committed);
        } else {
            frame.extend_from_slice(&committed[1..]);
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn committed(&self) -> String {
        String::from_utf8_lossy(&lock(&self.committed)).into_owned()
    }

    #[cfg(test)]
    pub(crate) fn has_ticker(&self) -> bool {
        lock(&self.ticker).is_some()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{invalidation_channel, Invalidations};
    use crate::config::IntervalPolicy;
    use crate::protocol::Block;

    fn instance(name: &str) -> (Instance, Invalidations, Arc<TickDivider>) {
        let divider = Arc::new(TickDivider::new(
            Duration::from_millis(10),
            IntervalPolicy::Strict,
        ));
        let (tx, rx) = invalidation_channel();
        let inst = Instance::new(name.to_string(), 16, Arc::clone(&divider), tx);
        (inst, rx, divider)
    }

    fn render_text(inst: &Instance, now: bool, text: &str) {
        inst.update(now, |r| r.block(Block::new(text).with_separator(true)));
    }

    #[test]
    fn test_identical_update_is_noop() {
        let (inst, rx, _) = instance("0");

        render_text(&inst, false, "a");
        assert!(rx.debounced.try_recv().is_ok());

        render_text(&inst, false, "a");
        assert!(rx.debounced.try_recv().is_err());
        assert!(rx.immediate.try_recv().is_err());

        render_text(&inst, true, "b");
        assert!(rx.immediate.try_recv().is_ok());
        assert!(rx.debounced.try_recv().is_err());
    }

    #[test]
    fn test_write_to_commas() {
        let (a, _rx, divider) = instance("0");
        let (tx, _rx2) = invalidation_channel();
        let empty = Instance::new("1".into(), 16, Arc::clone(&divider), tx.clone());
        let b = Instance::new("2".into(), 16, divider, tx);

        render_text(&a, false, "a");
        render_text(&b, false, "b");

        let mut frame = Vec::new();
        let mut comma = false;
        for inst in [&a, &empty, &b] {
            comma = inst.write_to(&mut frame, comma);
        }
        assert!(comma);
        assert_eq!(
            String::from_utf8(frame).unwrap(),
            r#"{"full_text":"a","name":"0","separator":true},{"full_text":"b","name":"2","separator":true}"#
        );

        let mut frame = Vec::new();
        assert!(!empty.write_to(&mut frame, false));
        assert!(frame.is_empty());
    }

    #[test]
    fn test_panicking_render_keeps_committed() {
        let (inst, _rx, _) = instance("0");
        render_text(&inst, false, "kept");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            inst.update(false, |r| {
                r.block(Block::new("partial"));
                panic!("render failed");
            });
        }));
        assert!(result.is_err());
        assert!(inst.committed().contains("kept"));
        assert!(!inst.committed().contains("partial"));

        render_text(&inst, false, "next");
        assert!(inst.committed().contains("next"));
        assert!(!inst.committed().contains("partial"));
    }

    #[test]
    fn test_tick_subscribe_and_reset() {
        let (inst, _rx, divider) = instance("0");
        inst.tick(Duration::from_millis(20)).unwrap();
        divider.tick();
        assert!(inst.ticked().try_recv().is_err());
        divider.tick();
        assert!(inst.ticked().try_recv().is_ok());

        inst.tick(Duration::from_millis(10)).unwrap();
        divider.tick();
        assert!(inst.ticked().try_recv().is_ok());

        assert!(inst.tick(Duration::from_millis(15)).is_err());

        inst.halt_ticks();
        assert!(!inst.has_ticker());
        divider.tick();
        assert!(inst.ticked().try_recv().is_err());
    }

    #[test]
    fn test_events_filtered_and_bounded() {
        let (inst, _rx, _) = instance("2");
        let other = Event {
            name: "1".into(),
            ..Event::default()
        };
        assert!(!inst.send_event(&other));
        assert!(inst.event().is_empty());

        let mine = Event {
            name: "2".into(),
            button: 1,
            ..Event::default()
        };
        for _ in 0..20 {
            assert!(inst.send_event(&mine));
        }
        assert_eq!(inst.event().len(), 16);

        inst.drain();
        assert!(inst.event().is_empty());
    }

    #[test]
    fn test_stopped_notification_coalesces() {
        let (inst, _rx, _) = instance("0");
        inst.set_stopped(true);
        assert!(inst.is_stopped());
        inst.set_stopped(false);
        assert!(!inst.is_stopped());
        assert_eq!(inst.stopped().len(), 1);
    }
}
