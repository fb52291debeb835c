//! Signal controller: pause/resume notifications from the host.
//!
//! The host sends the stop signal when the bar is hidden and the continue
//! signal when it is shown again. Both only flip every instance's stopped
//! flag; modules decide what pausing means for them.

use signal_hook::consts::FORBIDDEN;
use signal_hook::iterator::{Handle, Signals};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::instance::Instance;

/// Signal controller actor.
pub struct SignalController {
    handle: Option<JoinHandle<()>>,
    signals: Handle,
}

impl SignalController {
    /// Register `stop` and `cont` and spawn the dispatch thread.
    ///
    /// Signals that cannot be caught (such as `SIGSTOP`) are skipped with a
    /// warning; the host then pauses the process for real.
    pub fn spawn(stop: i32, cont: i32, instances: Arc<[Arc<Instance>]>) -> io::Result<Self> {
        let catchable: Vec<i32> = [stop, cont]
            .into_iter()
            .filter(|sig| {
                let ok = !FORBIDDEN.contains(sig);
                if !ok {
                    tracing::warn!(signal = sig, "signal cannot be caught, not handling it");
                }
                ok
            })
            .collect();

        let mut signals = Signals::new(&catchable)?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("tickbar-signals".to_string())
            .spawn(move || {
                for sig in signals.forever() {
                    Self::dispatch(&instances, sig, stop, cont);
                }
            })?;

        Ok(Self {
            handle: Some(thread),
            signals: handle,
        })
    }

    /// Apply one received signal. Unknown signals are ignored.
    pub fn dispatch(instances: &[Arc<Instance>], sig: i32, stop: i32, cont: i32) {
        if sig == stop {
            tracing::debug!(signal = sig, "bar stopped");
            Self::set_stopped(instances, true);
        } else if sig == cont {
            tracing::debug!(signal = sig, "bar continued");
            Self::set_stopped(instances, false);
        }
    }

    /// Set every instance's stopped flag and notify it.
    pub fn set_stopped(instances: &[Arc<Instance>], stopped: bool) {
        for instance in instances {
            instance.set_stopped(stopped);
        }
    }

    /// Stop listening and wait for the thread to finish.
    pub fn join(mut self) {
        self.signals.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SignalController {
    fn drop(&mut self) {
        self.signals.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::invalidation_channel;
    use crate::config::IntervalPolicy;
    use crate::tick::TickDivider;
    use signal_hook::consts::{SIGUSR1, SIGUSR2};
    use std::time::Duration;

    fn instances(count: usize) -> Arc<[Arc<Instance>]> {
        let divider = Arc::new(TickDivider::new(
            Duration::from_millis(10),
            IntervalPolicy::Strict,
        ));
        let (tx, _rx) = invalidation_channel();
        (0..count)
            .map(|i| Arc::new(Instance::new(i.to_string(), 16, Arc::clone(&divider), tx.clone())))
            .collect()
    }

    #[test]
    fn test_stop_then_continue() {
        let all = instances(3);

        SignalController::dispatch(&all, SIGUSR1, SIGUSR1, SIGUSR2);
        for inst in all.iter() {
            assert!(inst.is_stopped());
            assert!(inst.stopped().try_recv().is_ok());
        }

        SignalController::dispatch(&all, SIGUSR2, SIGUSR1, SIGUSR2);
        for inst in all.iter() {
            assert!(!inst.is_stopped());
            assert!(inst.stopped().try_recv().is_ok());
        }
    }

    #[test]
    fn test_unread_notifications_coalesce() {
        let all = instances(1);
        SignalController::dispatch(&all, SIGUSR1, SIGUSR1, SIGUSR2);
        SignalController::dispatch(&all, SIGUSR2, SIGUSR1, SIGUSR2);
        assert!(!all[0].is_stopped());
        assert_eq!(all[0].stopped().len(), 1);
    }

    #[test]
    fn test_other_signal_ignored() {
        let all = instances(1);
        SignalController::dispatch(&all, 15, SIGUSR1, SIGUSR2);
        assert!(!all[0].is_stopped());
        assert!(all[0].stopped().is_empty());
    }
}
