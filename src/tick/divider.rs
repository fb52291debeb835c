//! The tick divider and its timer thread.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::IntervalPolicy;
use crate::error::TickError;

/// Smallest accepted base interval.
const MIN_BASE: Duration = Duration::from_millis(1);

/// One registered consumer.
struct Subscriber {
    tx: Sender<()>,
    /// Base ticks per delivery, 0 = disabled.
    divisor: u64,
}

#[derive(Default)]
struct State {
    /// Base ticks fired so far.
    counter: u64,
    next_id: u64,
    stopped: bool,
    subscribers: HashMap<u64, Subscriber>,
}

struct Shared {
    base: Duration,
    policy: IntervalPolicy,
    state: Mutex<State>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn divisor(&self, interval: Duration) -> Result<u64, TickError> {
        if interval.is_zero() {
            return Ok(0);
        }
        let base = self.base.as_nanos();
        let nanos = interval.as_nanos();
        let divisor = match self.policy {
            IntervalPolicy::Round => ((nanos + base / 2) / base).max(1),
            IntervalPolicy::Strict if nanos % base == 0 => nanos / base,
            IntervalPolicy::Strict => {
                return Err(TickError::NotMultiple {
                    interval,
                    base: self.base,
                })
            }
        };
        Ok(u64::try_from(divisor).unwrap_or(u64::MAX))
    }

    fn fire(&self) {
        let mut state = self.lock();
        if state.stopped {
            return;
        }
        state.counter += 1;
        let counter = state.counter;
        for sub in state.subscribers.values() {
            if sub.divisor != 0 && counter % sub.divisor == 0 {
                // A full slot means the consumer has not caught up yet.
                let _ = sub.tx.try_send(());
            }
        }
    }
}

/// Handle to the base timer thread.
struct Timer {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Derives many quantized cadences from one base interval.
///
/// The divider can be driven by its own timer thread ([`TickDivider::start`])
/// or by hand with [`TickDivider::tick`].
pub struct TickDivider {
    shared: Arc<Shared>,
    timer: Mutex<Option<Timer>>,
}

impl TickDivider {
    /// Create a divider without starting its timer.
    ///
    /// Base intervals below one millisecond are raised to one millisecond.
    pub fn new(base: Duration, policy: IntervalPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                base: base.max(MIN_BASE),
                policy,
                state: Mutex::new(State::default()),
            }),
            timer: Mutex::new(None),
        }
    }

    /// Create a divider and start its timer thread.
    pub fn spawn(base: Duration, policy: IntervalPolicy) -> io::Result<Self> {
        let divider = Self::new(base, policy);
        divider.start()?;
        Ok(divider)
    }

    /// Start the timer thread. Does nothing if it is already running or the
    /// divider was stopped.
    pub fn start(&self) -> io::Result<()> {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.is_some() || self.shared.lock().stopped {
            return Ok(());
        }

        let (shutdown, shutdown_rx) = bounded(1);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("tickbar-ticker".to_string())
            .spawn(move || Self::run_loop(&shared, &shutdown_rx))?;

        *timer = Some(Timer { shutdown, handle });
        Ok(())
    }

    /// The base interval.
    pub fn base(&self) -> Duration {
        self.shared.base
    }

    /// Base ticks fired so far.
    pub fn count(&self) -> u64 {
        self.shared.lock().counter
    }

    /// Convert an interval into a divisor under the configured policy.
    pub fn divisor(&self, interval: Duration) -> Result<u64, TickError> {
        self.shared.divisor(interval)
    }

    /// Subscribe at `interval`. A zero interval registers a disabled
    /// subscription that can be enabled later with [`Subscription::reset`].
    ///
    /// The returned channel holds at most one pending tick. Dropping the
    /// [`Subscription`] unsubscribes.
    pub fn subscribe(&self, interval: Duration) -> Result<Subscription, TickError> {
        let (tx, rx) = bounded(1);
        self.attach(tx, rx, interval)
    }

    /// Subscribe with a caller-owned channel pair. The channel should be
    /// bounded to one slot.
    pub(crate) fn attach(
        &self,
        tx: Sender<()>,
        rx: Receiver<()>,
        interval: Duration,
    ) -> Result<Subscription, TickError> {
        let divisor = self.shared.divisor(interval)?;

        let mut state = self.shared.lock();
        if state.stopped {
            return Err(TickError::Stopped);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.insert(id, Subscriber { tx, divisor });
        drop(state);

        tracing::debug!(id, divisor, "tick subscription added");
        Ok(Subscription {
            id,
            rx,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Change the interval of an existing subscription.
    pub fn reset(&self, subscription: &Subscription, interval: Duration) -> Result<(), TickError> {
        subscription.reset(interval)
    }

    /// Fire one base tick by hand.
    pub fn tick(&self) {
        self.shared.fire();
    }

    /// Stop the timer thread and drop every subscription.
    ///
    /// Later subscribe and reset calls fail with [`TickError::Stopped`].
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            state.stopped = true;
            state.subscribers.clear();
        }

        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            let _ = timer.shutdown.send(());
            let _ = timer.handle.join();
        }
    }

    /// Main timer loop.
    fn run_loop(shared: &Shared, shutdown: &Receiver<()>) {
        let interval = shared.base;
        let mut next_tick = Instant::now() + interval;

        loop {
            let now = Instant::now();
            if now >= next_tick {
                shared.fire();
                next_tick += interval;

                // Behind schedule: skip missed ticks instead of bursting.
                if next_tick < now {
                    next_tick = now + interval;
                }
                continue;
            }

            match shutdown.recv_timeout(next_tick - now) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl Drop for TickDivider {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A registered tick consumer.
///
/// Dropping the subscription removes it from the divider.
pub struct Subscription {
    id: u64,
    rx: Receiver<()>,
    shared: Weak<Shared>,
}

impl Subscription {
    /// The tick channel. Holds at most one pending tick.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }

    /// Change the interval in place. Takes effect on the next base tick.
    pub fn reset(&self, interval: Duration) -> Result<(), TickError> {
        let shared = self.shared.upgrade().ok_or(TickError::Stopped)?;
        let divisor = shared.divisor(interval)?;

        let mut state = shared.lock();
        let sub = state
            .subscribers
            .get_mut(&self.id)
            .ok_or(TickError::Stopped)?;
        sub.divisor = divisor;
        drop(state);

        tracing::debug!(id = self.id, divisor, "tick subscription reset");
        Ok(())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().subscribers.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
