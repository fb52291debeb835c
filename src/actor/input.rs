//! Input Actor: dedicated thread reading click events from the host.
//!
//! Each line is framed and decoded with [`parse_line`], then routed to the
//! instance whose correlation id matches. Malformed lines are logged and
//! skipped. End of input or a read error ends the bar: the host is gone.

use crossbeam_channel::Sender;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::messages::Control;
use crate::error::BarError;
use crate::instance::Instance;
use crate::protocol::{parse_line, Event, Line};

/// Routes inbound events to instances.
pub struct EventRouter {
    handle: Option<JoinHandle<()>>,
}

impl EventRouter {
    /// Spawn the router thread reading from `input`.
    ///
    /// When the input ends, the reason is sent to `control` as
    /// [`Control::Fatal`].
    pub fn spawn<R>(
        input: R,
        instances: Arc<[Arc<Instance>]>,
        control: Sender<Control>,
    ) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("tickbar-input".to_string())
            .spawn(move || {
                let err = Self::run_loop(input, &instances);
                let _ = control.send(Control::Fatal(err));
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the router thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Deliver `event` to the instance it is addressed to. Returns the number
    /// of instances that accepted it.
    pub fn route(instances: &[Arc<Instance>], event: &Event) -> usize {
        let delivered = instances
            .iter()
            .filter(|instance| instance.send_event(event))
            .count();
        if delivered == 0 {
            tracing::debug!(name = %event.name, "event for unknown instance");
        }
        delivered
    }

    /// Main read loop. Only returns once the input is unusable.
    fn run_loop<R: BufRead>(mut input: R, instances: &[Arc<Instance>]) -> BarError {
        let mut buf = Vec::with_capacity(512);
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => return BarError::InputClosed,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return BarError::Input(e),
            }

            let line = String::from_utf8_lossy(&buf);
            match parse_line(&line) {
                Line::Skip => {}
                Line::Invalid => {
                    tracing::warn!(line = %line.trim_end(), "invalid event line");
                }
                Line::Event(event) => {
                    Self::route(instances, &event);
                }
            }
        }
    }
}
