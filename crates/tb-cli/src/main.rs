//! termbridge CLI
//!
//! Flags mirror the environment variables (NAME, REMOTE, SERVER_PORT,
//! TERMINAL, AUTO_EXIT, PASS), with an optional TOML config file
//! underneath both. Exit code 0 on clean shutdown, 1 on any validation
//! or orchestration error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tb_core::config::{self, Config};
use termbridge::Service;

#[derive(Parser)]
#[command(name = "termbridge")]
#[command(about = "Bridge a local shell to a remote relay endpoint")]
#[command(version)]
struct Args {
    /// Client identifier: relay routing key, gateway route, auth username
    #[arg(long, env = "NAME")]
    name: Option<String>,

    /// Remote relay address (host:port)
    #[arg(long, env = "REMOTE")]
    remote: Option<String>,

    /// Relay server port
    #[arg(long, env = "SERVER_PORT")]
    server_port: Option<u16>,

    /// Shell to use (zsh, bash, sh, powershell, ...)
    #[arg(long, env = "TERMINAL")]
    terminal: Option<String>,

    /// Shut down automatically after 24 hours
    #[arg(long, env = "AUTO_EXIT", value_name = "BOOL")]
    auto_exit: Option<bool>,

    /// Keep the session in tmux so it survives reconnects
    #[arg(long)]
    tmux: bool,

    /// Basic-auth password (empty disables authentication)
    #[arg(long, env = "PASS")]
    pass: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = build_config(&args)?;

    let service = Service::new(config)?;
    service.start().await
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                config::load_config(&default_path).unwrap_or_else(|e| {
                    tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                    Config::default()
                })
            } else {
                Config::default()
            }
        }
    };

    // Flags and environment override the file.
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(remote) = &args.remote {
        config.remote = remote.clone();
    }
    if let Some(server_port) = args.server_port {
        config.server_port = server_port;
    }
    if let Some(terminal) = &args.terminal {
        config.terminal = Some(terminal.clone());
    }
    if let Some(auto_exit) = args.auto_exit {
        config.auto_exit = auto_exit;
    }
    if args.tmux {
        config.tmux = true;
    }
    if let Some(pass) = &args.pass {
        config.pass = pass.clone();
    }

    Ok(config)
}
