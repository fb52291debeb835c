//! The module contract.

use crate::instance::Instance;

/// A status bar module with its own main loop.
///
/// The implementing type should only hold read-only configuration; all state
/// belongs inside [`Module::run`], so a restart after a fault starts clean.
///
/// `run` loops forever, reacting to the instance's tick, event and stopped
/// channels and publishing output with [`Instance::update`]. Returning an
/// error (or panicking) shows an error block until the next click, which
/// restarts the module. Returning `Ok(())` ends the module for good.
pub trait Module: Send + Sync + 'static {
    /// The module's main loop.
    fn run(&self, instance: &Instance) -> anyhow::Result<()>;
}

impl<M: Module + ?Sized> Module for Box<M> {
    fn run(&self, instance: &Instance) -> anyhow::Result<()> {
        (**self).run(instance)
    }
}

/// Wraps a closure as a [`Module`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleFn<F>(pub F);

impl<F> Module for ModuleFn<F>
where
    F: Fn(&Instance) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn run(&self, instance: &Instance) -> anyhow::Result<()> {
        (self.0)(instance)
    }
}

/// Box a closure as a module.
pub fn module_fn<F>(f: F) -> Box<dyn Module>
where
    F: Fn(&Instance) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Box::new(ModuleFn(f))
}
