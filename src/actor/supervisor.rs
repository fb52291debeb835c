//! Supervisor: runs one module and contains its failures.
//!
//! ```text
//!            error / panic              one click
//! Running ─────────────────▶ Faulted ─────────────▶ Running (fresh run)
//!    │
//!    └── Ok(()) ──▶ finished
//! ```
//!
//! Entering `Faulted` tears down the tick subscription, discards queued
//! clicks and ticks, and immediately renders an urgent error block. The
//! supervisor then waits for one new click before starting the module again.

use std::any::Any;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::anyhow;

use crate::instance::Instance;
use crate::module::Module;

/// Fault state of one module.
#[derive(Debug)]
pub enum ModuleState {
    /// The entry point is (about to be) running.
    Running,
    /// The entry point failed; waiting for a click.
    Faulted(anyhow::Error),
}

/// Supervisor actor owning one module thread.
pub struct Supervisor {
    handle: JoinHandle<()>,
}

impl Supervisor {
    /// Spawn the module thread.
    pub fn spawn(module: Arc<dyn Module>, instance: Arc<Instance>) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("tickbar-module-{}", instance.name()))
            .spawn(move || Self::run_loop(module.as_ref(), &instance))?;

        Ok(Self { handle })
    }

    /// Whether the module has returned for good.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Drive the state machine until the module finishes.
    fn run_loop(module: &dyn Module, instance: &Instance) {
        let mut state = ModuleState::Running;
        loop {
            state = match state {
                ModuleState::Running => match Self::run_once(module, instance) {
                    Ok(()) => {
                        tracing::info!(instance = %instance.name(), "module finished");
                        return;
                    }
                    Err(err) => ModuleState::Faulted(err),
                },
                ModuleState::Faulted(err) => {
                    if !Self::fault(instance, &err) {
                        return;
                    }
                    tracing::info!(instance = %instance.name(), "restarting module");
                    ModuleState::Running
                }
            };
        }
    }

    /// Run the entry point once, turning a panic into an error.
    fn run_once(module: &dyn Module, instance: &Instance) -> anyhow::Result<()> {
        catch_unwind(AssertUnwindSafe(|| module.run(instance)))
            .unwrap_or_else(|payload| Err(anyhow!("panic: {}", panic_message(payload.as_ref()))))
    }

    /// Show the error and wait for a click. Returns false if the event
    /// channel is gone.
    fn fault(instance: &Instance, err: &anyhow::Error) -> bool {
        tracing::error!(instance = %instance.name(), error = %format!("{err:#}"), "module faulted");

        instance.halt_ticks();
        instance.drain();
        let message = format!("fatal: {err:#}");
        instance.update(true, |render| render.err(&message));

        instance.wait_event().is_some()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::invalidation_channel;
    use crate::config::IntervalPolicy;
    use crate::module::module_fn;
    use crate::protocol::{Block, Event};
    use crate::tick::TickDivider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn instance() -> Arc<Instance> {
        let divider = Arc::new(TickDivider::new(
            Duration::from_millis(10),
            IntervalPolicy::Strict,
        ));
        let (tx, _rx) = invalidation_channel();
        Arc::new(Instance::new("0".into(), 16, divider, tx))
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn click() -> Event {
        Event {
            name: "0".into(),
            button: 1,
            ..Event::default()
        }
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown payload");
    }

    #[test]
    fn test_ok_return_finishes() {
        let inst = instance();
        let module: Arc<dyn Module> = Arc::from(module_fn(|i: &Instance| {
            i.update(false, |r| r.block(Block::new("done")));
            Ok(())
        }));
        let supervisor = Supervisor::spawn(module, Arc::clone(&inst)).unwrap();
        assert!(wait_until(|| supervisor.is_finished()));
        assert!(inst.committed().contains("done"));
    }

    #[test]
    fn test_error_then_click_restarts() {
        let inst = instance();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let module: Arc<dyn Module> = Arc::from(module_fn(move |i: &Instance| {
            let run = counter.fetch_add(1, Ordering::SeqCst);
            i.tick(Duration::from_millis(10))?;
            if run == 0 {
                anyhow::bail!("sensor missing");
            }
            i.update(false, |r| r.block(Block::new(format!("run {run}"))));
            i.event().recv()?;
            Ok(())
        }));

        // A click queued before the fault must not restart the module.
        assert!(inst.send_event(&click()));
        let _supervisor = Supervisor::spawn(module, Arc::clone(&inst)).unwrap();

        assert!(wait_until(|| inst.committed().contains("fatal: sensor missing")));
        assert!(inst.committed().contains(r#""urgent":true"#));
        assert!(!inst.has_ticker());
        thread::sleep(Duration::from_millis(30));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert!(inst.send_event(&click()));
        assert!(wait_until(|| inst.committed().contains("run 1")));
        assert!(inst.has_ticker());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panic_is_contained() {
        let inst = instance();
        let module: Arc<dyn Module> = Arc::from(module_fn(|_: &Instance| -> anyhow::Result<()> {
            panic!("index out of range");
        }));
        let _supervisor = Supervisor::spawn(module, Arc::clone(&inst)).unwrap();

        assert!(wait_until(|| inst
            .committed()
            .contains("error: fatal: panic: index out of range")));
    }
}
