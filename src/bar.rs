//! Bar: the scheduler object that ties the actors together.
//!
//! A `Bar` owns the tick divider, one instance per module and the
//! aggregator's channels. [`Bar::run`] wires it to stdin, stdout and the
//! stop/continue signals; [`Bar::serve`] takes any reader and writer.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;

use crate::actor::{
    invalidation_channel, Aggregator, Control, EventRouter, Invalidations, SignalController,
    Supervisor,
};
use crate::config::BarConfig;
use crate::error::BarError;
use crate::instance::Instance;
use crate::module::Module;
use crate::protocol::Event;
use crate::tick::TickDivider;

/// The status bar.
pub struct Bar {
    config: BarConfig,
    divider: Arc<TickDivider>,
    modules: Vec<Arc<dyn Module>>,
    instances: Arc<[Arc<Instance>]>,
    invalidations: Invalidations,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
}

impl Bar {
    /// Create a bar showing `modules` left to right.
    ///
    /// Each module gets an instance whose correlation id is its position.
    /// Nothing runs until [`Bar::run`] or [`Bar::serve`].
    pub fn new<I>(config: BarConfig, modules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Module>>,
    {
        let divider = Arc::new(TickDivider::new(config.tick_base, config.interval_policy));
        let (invalidator, invalidations) = invalidation_channel();
        let (control_tx, control_rx) = bounded(4);

        let modules: Vec<Arc<dyn Module>> = modules.into_iter().map(Arc::from).collect();
        let instances: Arc<[Arc<Instance>]> = (0..modules.len())
            .map(|i| {
                Arc::new(Instance::new(
                    i.to_string(),
                    config.event_capacity,
                    Arc::clone(&divider),
                    invalidator.clone(),
                ))
            })
            .collect();

        Self {
            config,
            divider,
            modules,
            instances,
            invalidations,
            control_tx,
            control_rx,
        }
    }

    /// The configuration.
    pub const fn config(&self) -> &BarConfig {
        &self.config
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the bar has no modules.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// A handle for controlling the bar from other threads.
    pub fn handle(&self) -> BarHandle {
        BarHandle {
            instances: Arc::clone(&self.instances),
            control: self.control_tx.clone(),
        }
    }

    /// Run on stdin and stdout, handling the configured stop and continue
    /// signals.
    ///
    /// Only returns on failure: the output breaking, the input closing, or a
    /// [`BarHandle::shutdown`].
    pub fn run(self) -> Result<(), BarError> {
        let signals = SignalController::spawn(
            self.config.stop_signal,
            self.config.cont_signal,
            Arc::clone(&self.instances),
        )
        .map_err(BarError::Signals)?;

        let stdout = io::stdout();
        let result = self.serve(BufReader::new(io::stdin()), stdout.lock());
        signals.join();
        result
    }

    /// Run with click events read from `input` and frames written to
    /// `output`. The calling thread becomes the aggregator.
    ///
    /// The tick divider is stopped before returning, whatever the outcome.
    pub fn serve<R, W>(self, input: R, output: W) -> Result<(), BarError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (supervisors, router) = match self.spawn_actors(input) {
            Ok(actors) => actors,
            Err(err) => {
                self.divider.stop();
                return Err(err);
            }
        };

        tracing::info!(modules = self.instances.len(), "bar started");

        let header = self.config.emit_header.then(|| self.config.init());
        let aggregator = Aggregator::new(
            Arc::clone(&self.instances),
            self.invalidations,
            self.control_rx,
            self.config.debounce,
            header,
            output,
        );
        let result = aggregator.run();

        self.divider.stop();
        if matches!(result, Err(BarError::InputClosed | BarError::Input(_))) {
            router.join();
        }
        let finished = supervisors.iter().filter(|s| s.is_finished()).count();
        tracing::info!(finished, running = supervisors.len() - finished, "bar stopped");
        result
    }

    /// Start the ticker, one supervisor per module and the event router.
    fn spawn_actors<R>(&self, input: R) -> Result<(Vec<Supervisor>, EventRouter), BarError>
    where
        R: BufRead + Send + 'static,
    {
        self.divider.start().map_err(spawn_err("ticker"))?;

        let supervisors = self
            .modules
            .iter()
            .zip(self.instances.iter())
            .map(|(module, instance)| Supervisor::spawn(Arc::clone(module), Arc::clone(instance)))
            .collect::<io::Result<Vec<_>>>()
            .map_err(spawn_err("module"))?;

        let router =
            EventRouter::spawn(input, Arc::clone(&self.instances), self.control_tx.clone())
                .map_err(spawn_err("input"))?;

        Ok((supervisors, router))
    }
}

fn spawn_err(name: &'static str) -> impl FnOnce(io::Error) -> BarError {
    move |source| BarError::Spawn {
        name: name.to_string(),
        source,
    }
}

/// Cloneable control handle for a running [`Bar`].
#[derive(Clone)]
pub struct BarHandle {
    instances: Arc<[Arc<Instance>]>,
    control: Sender<Control>,
}

impl BarHandle {
    /// Ask the aggregator to stop; `run`/`serve` then return `Ok(())`.
    pub fn shutdown(&self) {
        let _ = self.control.send(Control::Shutdown);
    }

    /// Mark every instance stopped or running, as the signals do.
    pub fn set_stopped(&self, stopped: bool) {
        SignalController::set_stopped(&self.instances, stopped);
    }

    /// Deliver a click as if it came from the input stream. Returns the
    /// number of instances that accepted it.
    pub fn dispatch(&self, event: &Event) -> usize {
        EventRouter::route(&self.instances, event)
    }
}

impl std::fmt::Debug for BarHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarHandle")
            .field("instances", &self.instances.len())
            .finish()
    }
}
