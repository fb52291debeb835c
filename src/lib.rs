//! # Tickbar
//!
//! The scheduling core of an i3bar-protocol status bar.
//!
//! Each module runs its own main loop on its own thread and publishes blocks
//! through an [`Instance`]. Tickbar takes care of the shared plumbing:
//!
//! ## Core Concepts
//!
//! - **Tick division**: one base timer, many phase-aligned cadences
//! - **Double-buffered rendering**: a module's output is serialized into a
//!   draft buffer and only invalidates the bar if it differs from the last one
//! - **Fault isolation**: a module that errors or panics shows an error block
//!   and restarts on the next click; nothing else is affected
//! - **Debounced output**: bursts of updates collapse into one frame, clicks
//!   render immediately
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tickbar::{module_fn, Bar, BarConfig, Block};
//!
//! let clock = module_fn(|i| {
//!     i.tick(Duration::from_secs(1))?;
//!     let mut seconds = 0u64;
//!     loop {
//!         i.update(false, |r| r.block(Block::new(format!("{seconds}s"))));
//!         i.ticked().recv()?;
//!         seconds += 1;
//!     }
//! });
//!
//! Bar::new(BarConfig::default(), vec![clock]).run()?;
//! # Ok::<(), tickbar::BarError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod bar;
pub mod config;
pub mod error;
pub mod instance;
pub mod module;
pub mod output;
pub mod protocol;
pub mod tick;

// Re-exports for convenience
pub use bar::{Bar, BarHandle};
pub use config::{BarConfig, IntervalPolicy};
pub use error::{BarError, TickError};
pub use instance::{Instance, Renderer};
pub use module::{module_fn, Module, ModuleFn};
pub use protocol::{button, Align, Block, BorderWidth, Color, Event, MinWidth, Modifiers};
pub use tick::{Subscription, TickDivider};
