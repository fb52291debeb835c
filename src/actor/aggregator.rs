//! Aggregator: the only writer of the output stream.
//!
//! Waits for invalidations and turns them into frames. Immediate
//! invalidations flush at once; normal ones wait out the debounce window
//! (an immediate one arriving meanwhile cuts the wait short). Right before
//! writing, any signals that piled up are discarded, since the frame about to
//! be written already includes their output.

use crossbeam_channel::{after, select, Receiver, RecvError};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use super::messages::{Control, Invalidations};
use crate::error::BarError;
use crate::instance::Instance;
use crate::output::FrameBuffer;
use crate::protocol::Init;

/// Why the wait for the next flush ended.
enum Wake {
    Flush,
    Stop(Result<(), BarError>),
}

/// The output main loop.
pub struct Aggregator<W: Write> {
    instances: Arc<[Arc<Instance>]>,
    invalidations: Invalidations,
    control: Receiver<Control>,
    debounce: Duration,
    header: Option<Init>,
    frame: FrameBuffer,
    out: W,
}

impl<W: Write> Aggregator<W> {
    /// Create the aggregator. `header`, if set, is written before anything
    /// else.
    pub fn new(
        instances: Arc<[Arc<Instance>]>,
        invalidations: Invalidations,
        control: Receiver<Control>,
        debounce: Duration,
        header: Option<Init>,
        out: W,
    ) -> Self {
        Self {
            instances,
            invalidations,
            control,
            debounce,
            header,
            frame: FrameBuffer::new(),
            out,
        }
    }

    /// Run until shutdown or a fatal error.
    pub fn run(mut self) -> Result<(), BarError> {
        if let Some(init) = self.header.take() {
            self.frame.header(&init);
            self.frame.flush_to(&mut self.out).map_err(BarError::Output)?;
        }

        loop {
            match self.wait() {
                Wake::Flush => {
                    self.invalidations.drain();
                    self.flush()?;
                }
                Wake::Stop(result) => return result,
            }
        }
    }

    /// Block until a frame should be written.
    fn wait(&self) -> Wake {
        let immediate = &self.invalidations.immediate;
        let debounced = &self.invalidations.debounced;

        select! {
            recv(immediate) -> msg => Self::woken(msg),
            recv(debounced) -> msg => {
                if msg.is_err() {
                    return Wake::Stop(Ok(()));
                }
                let deadline = after(self.debounce);
                select! {
                    recv(deadline) -> _ => Wake::Flush,
                    recv(immediate) -> msg => Self::woken(msg),
                    recv(self.control) -> msg => Self::control(msg),
                }
            },
            recv(self.control) -> msg => Self::control(msg),
        }
    }

    fn woken(msg: Result<(), RecvError>) -> Wake {
        match msg {
            Ok(()) => Wake::Flush,
            Err(RecvError) => Wake::Stop(Ok(())),
        }
    }

    fn control(msg: Result<Control, RecvError>) -> Wake {
        match msg {
            Ok(Control::Shutdown) | Err(RecvError) => Wake::Stop(Ok(())),
            Ok(Control::Fatal(err)) => {
                tracing::error!(error = %err, "stopping bar");
                Wake::Stop(Err(err))
            }
        }
    }

    /// Write one frame with every instance's committed output, in order.
    fn flush(&mut self) -> Result<(), BarError> {
        self.frame.begin_frame();
        let mut comma = false;
        for instance in self.instances.iter() {
            comma = instance.write_to(self.frame.body_mut(), comma);
        }
        self.frame.end_frame();
        self.frame.flush_to(&mut self.out).map_err(BarError::Output)
    }
}
