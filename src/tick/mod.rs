//! Tick division: many cadences from one base timer.
//!
//! Every consumer asks for an interval; the divider turns it into a divisor
//! of its base tick and delivers a notification whenever the shared tick
//! counter is a multiple of that divisor. Consumers asking for multiples of
//! each other's interval therefore tick in phase, which lets the aggregator
//! coalesce their renders into a single frame.

mod divider;

pub use divider::{Subscription, TickDivider};
