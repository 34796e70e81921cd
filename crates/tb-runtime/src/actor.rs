//! The unit of work the supervisor schedules

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

pub(crate) type RunFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
pub(crate) type InterruptFn = Box<dyn FnOnce() + Send>;

/// A schedulable unit: a run future paired with an interrupt.
///
/// The run future either runs until the shared cancellation token fires
/// (and then returns `Ok(())` - shutdown is not an error) or fails and
/// returns its error immediately. The interrupt is called exactly once by
/// the supervisor when any actor in the group finishes, to unblock this
/// actor if shared cancellation alone does not.
///
/// Actors are built fresh for each service run and consumed by
/// [`Supervisor::run`](crate::Supervisor::run).
pub struct Actor {
    pub(crate) name: String,
    pub(crate) run: RunFuture,
    pub(crate) interrupt: InterruptFn,
}

impl Actor {
    /// Create an actor from a run future and an interrupt closure.
    pub fn new<F, I>(name: impl Into<String>, run: F, interrupt: I) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
        I: FnOnce() + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::pin(run),
            interrupt: Box::new(interrupt),
        }
    }

    /// Name used for logging and error attribution
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor").field("name", &self.name).finish()
    }
}
