//! Wall-clock service budget
//!
//! Long-forgotten bridge sessions are a liability on the relay; when
//! auto-exit is enabled the service shuts itself down after a fixed
//! budget. The caller simply does not register this actor when auto-exit
//! is configured off.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::actor::Actor;

/// Build the auto-exit actor.
///
/// Blocks until `ttl` elapses or the shared token fires; expiry fires the
/// token and is reported as a clean exit.
pub fn auto_exit(token: CancellationToken, ttl: Duration) -> Actor {
    let interrupt = token.clone();
    Actor::new(
        "auto-exit",
        async move {
            tokio::select! {
                _ = tokio::time::sleep(ttl) => {
                    tracing::info!(?ttl, "service budget elapsed, shutting down");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
            Ok(())
        },
        move || interrupt.cancel(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Supervisor;
    use std::time::Instant;

    #[tokio::test]
    async fn expiry_cancels_the_group() {
        let mut sup = Supervisor::new();
        let token = sup.cancellation();

        let waiter = token.clone();
        sup.register(Actor::new(
            "waiter",
            async move {
                waiter.cancelled().await;
                Ok(())
            },
            || {},
        ));
        sup.register(auto_exit(token, Duration::from_millis(20)));

        let started = Instant::now();
        sup.run().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn cancellation_beats_the_timer() {
        let token = CancellationToken::new();
        let actor = auto_exit(token.clone(), Duration::from_secs(3600));
        token.cancel();
        assert!(actor.run.await.is_ok());
    }
}
