//! The lifecycle supervisor
//!
//! Runs every registered actor concurrently and converts the first
//! completion - success or failure - into a full group shutdown. One
//! subsystem crashing means the whole service drains and exits cleanly.

use std::collections::HashMap;

use anyhow::Result;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::actor::Actor;

/// Supervises a fixed group of actors for a single run.
///
/// Owns the shared cancellation token (created at construction, fired at
/// most once) and the registered actors in registration order. The order
/// does not affect which actor wins the race to finish, but it makes
/// interrupt fan-out and error selection deterministic.
pub struct Supervisor {
    cancel: CancellationToken,
    actors: Vec<Actor>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            actors: Vec::new(),
        }
    }

    /// Clone of the shared cancellation token.
    ///
    /// Firing it is idempotent; once fired it never resets. Actors use it
    /// both as a blockable wait (`cancelled()`) and as a non-blocking
    /// check (`is_cancelled()`).
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Register an actor. Registration order is preserved.
    pub fn register(&mut self, actor: Actor) {
        tracing::debug!(actor = actor.name(), "registered");
        self.actors.push(actor);
    }

    /// Names of the registered actors, in registration order
    pub fn actor_names(&self) -> Vec<&str> {
        self.actors.iter().map(|a| a.name()).collect()
    }

    /// Run the group to completion.
    ///
    /// Launches every actor, waits for the first one to return for any
    /// reason, then fires the shared token, invokes every interrupt
    /// exactly once in registration order, and waits for the rest. There
    /// is no drain timeout: an actor that ignores cancellation blocks the
    /// group indefinitely.
    ///
    /// The result is the first error in registration order, annotated
    /// with the failing actor's name; later errors are discarded. A group
    /// in which every actor finished cleanly yields `Ok(())`.
    pub async fn run(self) -> Result<()> {
        let Supervisor { cancel, actors } = self;
        if actors.is_empty() {
            return Ok(());
        }

        let mut names = Vec::with_capacity(actors.len());
        let mut interrupts = Vec::with_capacity(actors.len());
        let mut indices = HashMap::new();
        let mut set = JoinSet::new();

        for (index, actor) in actors.into_iter().enumerate() {
            let Actor {
                name,
                run,
                interrupt,
            } = actor;
            tracing::debug!(actor = %name, "launching");
            names.push(name);
            interrupts.push(interrupt);
            let handle = set.spawn(run);
            indices.insert(handle.id(), index);
        }

        let mut outcomes: Vec<Option<Result<()>>> = Vec::new();
        outcomes.resize_with(names.len(), || None);

        // Running -> Draining: edge-triggered by the first return.
        if let Some(joined) = set.join_next_with_id().await {
            record_outcome(&mut outcomes, &indices, &names, joined);
        }

        cancel.cancel();
        for interrupt in interrupts {
            interrupt();
        }

        // Draining -> Stopped once every run future has returned.
        while let Some(joined) = set.join_next_with_id().await {
            record_outcome(&mut outcomes, &indices, &names, joined);
        }

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Some(Err(e)) => {
                    tracing::error!(actor = %names[index], error = %e, "actor failed");
                    return Err(e.context(format!("{} terminated", names[index])));
                }
                Some(Ok(())) => {}
                // Unreachable: every spawned task is joined above.
                None => {}
            }
        }

        Ok(())
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

fn record_outcome(
    outcomes: &mut [Option<Result<()>>],
    indices: &HashMap<tokio::task::Id, usize>,
    names: &[String],
    joined: Result<(tokio::task::Id, Result<()>), tokio::task::JoinError>,
) {
    match joined {
        Ok((id, result)) => {
            if let Some(&index) = indices.get(&id) {
                tracing::debug!(actor = %names[index], ok = result.is_ok(), "actor returned");
                outcomes[index] = Some(result);
            }
        }
        Err(join_err) => {
            if let Some(&index) = indices.get(&join_err.id()) {
                outcomes[index] = Some(Err(anyhow::anyhow!(
                    "{} panicked: {}",
                    names[index],
                    join_err
                )));
            }
        }
    }
}
