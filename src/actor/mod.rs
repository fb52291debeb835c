//! Actor Model: one thread per concern, connected by crossbeam channels.
//!
//! - **Supervisor** (one per module): runs the module, contains its faults
//! - **Aggregator** (caller's thread): debounces invalidations, writes frames
//! - **Event Router**: reads click events, delivers them to instances
//! - **Signal Controller**: turns stop/continue signals into stopped flags
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  Event   ┌──────────┐  update()  ┌──────────────┐
//! │Event Router │ ───────▶ │ Instance │ ◀───────── │  Supervisor  │
//! └─────────────┘          │          │  ticks     │   + Module   │
//! ┌─────────────┐ stopped  │          │ ◀──┐       └──────────────┘
//! │Signal Ctrl  │ ───────▶ │          │    │      ┌──────────────┐
//! └─────────────┘          └──────────┘    └───── │ Tick Divider │
//!                               │ Invalidation    └──────────────┘
//!                               ▼
//!                         ┌────────────┐  frame   ┌────────┐
//!                         │ Aggregator │ ───────▶ │ stdout │
//!                         └────────────┘          └────────┘
//! ```

mod aggregator;
mod input;
mod messages;
mod signals;
mod supervisor;

pub use aggregator::Aggregator;
pub use input::EventRouter;
pub use messages::{invalidation_channel, Control, Invalidation, Invalidations, Invalidator};
pub use signals::SignalController;
pub use supervisor::{ModuleState, Supervisor};
