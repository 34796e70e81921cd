//! OS signal watcher
//!
//! Converts process termination signals into shared cancellation so the
//! whole actor group drains instead of dying mid-write.

use tokio_util::sync::CancellationToken;

use crate::actor::Actor;

/// Build the signal-watching actor.
///
/// Blocks until an interrupt/terminate signal arrives (plus SIGQUIT on
/// unix) or the shared token fires, whichever comes first. A received
/// signal fires the token and is reported as a clean exit.
pub fn watcher(token: CancellationToken) -> Actor {
    let interrupt = token.clone();
    Actor::new(
        "signal-watcher",
        async move {
            let ctrl_c = tokio::signal::ctrl_c();

            #[cfg(unix)]
            let terminate = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install signal handler")
                    .recv()
                    .await;
            };
            #[cfg(unix)]
            let quit = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::quit())
                    .expect("failed to install signal handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();
            #[cfg(not(unix))]
            let quit = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("received interrupt, shutting down");
                }
                _ = terminate => {
                    tracing::info!("received terminate signal, shutting down");
                }
                _ = quit => {
                    tracing::info!("received quit signal, shutting down");
                }
                _ = token.cancelled() => return Ok(()),
            }

            token.cancel();
            Ok(())
        },
        move || interrupt.cancel(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watcher_unblocks_on_cancellation() {
        let token = CancellationToken::new();
        let actor = watcher(token.clone());
        token.cancel();
        assert!(actor.run.await.is_ok());
    }

    #[tokio::test]
    async fn interrupt_fires_the_token() {
        let token = CancellationToken::new();
        let actor = watcher(token.clone());
        (actor.interrupt)();
        assert!(token.is_cancelled());
        assert!(actor.run.await.is_ok());
    }
}
