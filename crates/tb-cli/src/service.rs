//! The service handle
//!
//! One owned handle per service: validate the configuration up front,
//! then `start()` allocates the local port, resolves the shell, builds
//! the actor group and blocks on the supervisor. `stop()` fires the
//! shared cancellation token from any thread. State lives on the handle,
//! never in process globals, so embedders hold exactly one instance and
//! drop it when done.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;

use tb_core::{config::Config, port, shell, ConfigError};
use tb_gateway::{Credential, GatewayOptions, GatewayServer};
use tb_relay::{ListenerBinding, RelayClient, RelayOptions};
use tb_runtime::{signal, timeout, Actor, Supervisor};

/// Service budget when auto-exit is enabled
const AUTO_EXIT_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Default)]
struct Inner {
    running: bool,
    cancel: Option<CancellationToken>,
}

/// An owned, single-instance handle to the bridge service
#[derive(Debug)]
pub struct Service {
    config: Config,
    inner: Mutex<Inner>,
}

impl Service {
    /// Validate the configuration and build a handle. No actor exists
    /// until [`start`](Self::start).
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            inner: Mutex::new(Inner::default()),
        })
    }

    /// Run the service until it stops.
    ///
    /// Allocates the local gateway port (exactly once per run), resolves
    /// the shell, then runs the actor group to completion. Returns the
    /// supervisor's verdict: `Ok` on a clean shutdown (signal, timer,
    /// [`stop`](Self::stop)), the first actor error otherwise. A second
    /// concurrent `start` on the same handle is an error.
    pub async fn start(&self) -> Result<()> {
        let mut config = self.config.clone();
        config.local_port = port::find_available_port();
        let shell = shell::resolve(config.terminal.as_deref());

        let supervisor = build_supervisor(&config, &shell);
        {
            let mut inner = self.inner.lock().expect("service state lock poisoned");
            if inner.running {
                bail!("service is already running");
            }
            inner.running = true;
            inner.cancel = Some(supervisor.cancellation());
        }

        banner(&config, &shell);
        let result = supervisor.run().await;

        let mut inner = self.inner.lock().expect("service state lock poisoned");
        inner.running = false;
        inner.cancel = None;

        result
    }

    /// Request shutdown. Idempotent; a no-op when nothing is running.
    pub fn stop(&self) {
        let inner = self.inner.lock().expect("service state lock poisoned");
        if let Some(cancel) = &inner.cancel {
            cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .expect("service state lock poisoned")
            .running
    }
}

/// Build the actor group for one run.
///
/// Registration order: relay client, terminal gateway, signal watcher,
/// then the auto-exit timer - which is simply absent when auto-exit is
/// configured off.
fn build_supervisor(config: &Config, shell: &str) -> Supervisor {
    let mut supervisor = Supervisor::new();
    let cancel = supervisor.cancellation();

    let relay_options = relay_options(config);
    let relay_cancel = cancel.clone();
    supervisor.register(Actor::new(
        "relay-client",
        async move {
            let client = RelayClient::connect(relay_options).await?;
            client.run(relay_cancel).await?;
            Ok(())
        },
        // Stops via the shared token fired by the supervisor.
        || {},
    ));

    let gateway_options = gateway_options(config, shell);
    let gateway_cancel = cancel.clone();
    supervisor.register(Actor::new(
        "terminal-gateway",
        async move { GatewayServer::new(gateway_options).run(gateway_cancel).await },
        || {},
    ));

    supervisor.register(signal::watcher(cancel.clone()));

    if config.auto_exit {
        supervisor.register(timeout::auto_exit(cancel, AUTO_EXIT_AFTER));
    }

    supervisor
}

fn gateway_options(config: &Config, shell: &str) -> GatewayOptions {
    let credential = config.auth_enabled().then(|| Credential {
        user: config.name.clone(),
        pass: config.pass.clone(),
    });

    let (command, args) = if config.tmux {
        (
            "tmux".to_string(),
            vec![
                "new-session".to_string(),
                "-A".to_string(),
                "-s".to_string(),
                config.name.clone(),
            ],
        )
    } else {
        (shell.to_string(), Vec::new())
    };

    GatewayOptions {
        address: "127.0.0.1".to_string(),
        port: config.local_port,
        path: format!("/{}", config.name),
        permit_write: true,
        credential,
        command,
        args,
    }
}

fn relay_options(config: &Config) -> RelayOptions {
    RelayOptions::new(
        &config.remote,
        vec![ListenerBinding {
            endpoint: config.name.clone(),
            forward_addr: format!("127.0.0.1:{}", config.local_port),
        }],
    )
}

fn banner(config: &Config, shell: &str) {
    tracing::info!(name = %config.name, remote = %config.remote, "starting termbridge");
    tracing::info!(%shell, tmux = config.tmux, auto_exit = config.auto_exit, "session settings");
    tracing::info!(port = config.local_port, "local gateway port");
    tracing::info!(
        "local access: http://localhost:{}/{}",
        config.local_port,
        config.name
    );
    if config.auth_enabled() {
        tracing::info!(user = %config.name, "basic auth enabled");
    } else {
        tracing::warn!("basic auth disabled");
    }
}
