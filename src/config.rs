//! Bar configuration.

use std::time::Duration;

use signal_hook::consts::{SIGUSR1, SIGUSR2};

use crate::protocol::Init;

/// What to do with a tick interval that is not a multiple of the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalPolicy {
    /// Round to the nearest multiple. A non-zero interval never rounds down
    /// to "disabled"; it becomes one base tick.
    #[default]
    Round,
    /// Reject the interval with [`TickError::NotMultiple`](crate::TickError::NotMultiple).
    Strict,
}

/// Configuration for a [`Bar`](crate::Bar).
#[derive(Debug, Clone)]
pub struct BarConfig {
    /// Base interval of the shared tick divider.
    pub tick_base: Duration,
    /// How long a normal invalidation waits for more before flushing.
    pub debounce: Duration,
    /// Handling of intervals that are not a multiple of `tick_base`.
    pub interval_policy: IntervalPolicy,
    /// Click events buffered per instance before new ones are dropped.
    pub event_capacity: usize,
    /// Signal the host sends to pause the bar.
    pub stop_signal: i32,
    /// Signal the host sends to resume the bar.
    pub cont_signal: i32,
    /// Ask the host for click events.
    pub click_events: bool,
    /// Write the init line and array opener before the first frame.
    pub emit_header: bool,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            tick_base: Duration::from_millis(250),
            debounce: Duration::from_millis(25),
            interval_policy: IntervalPolicy::Round,
            event_capacity: 16,
            stop_signal: SIGUSR1,
            cont_signal: SIGUSR2,
            click_events: true,
            emit_header: true,
        }
    }
}

impl BarConfig {
    /// Set the base tick interval.
    #[must_use]
    pub const fn with_tick_base(mut self, tick_base: Duration) -> Self {
        self.tick_base = tick_base;
        self
    }

    /// Set the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the interval policy.
    #[must_use]
    pub const fn with_interval_policy(mut self, policy: IntervalPolicy) -> Self {
        self.interval_policy = policy;
        self
    }

    /// Set the per-instance event queue depth (at least 1).
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Set the stop and continue signals.
    #[must_use]
    pub const fn with_signals(mut self, stop: i32, cont: i32) -> Self {
        self.stop_signal = stop;
        self.cont_signal = cont;
        self
    }

    /// Enable or disable the header lines.
    #[must_use]
    pub const fn with_header(mut self, emit_header: bool) -> Self {
        self.emit_header = emit_header;
        self
    }

    /// The init object announced to the host.
    pub const fn init(&self) -> Init {
        Init {
            stop_signal: Some(self.stop_signal),
            cont_signal: Some(self.cont_signal),
            click_events: self.click_events,
        }
    }
}
