//! tb-core: Core configuration and host probing for termbridge
//!
//! This crate provides the validated service configuration plus the two
//! host-dependent probes the rest of the workspace relies on: finding a
//! free local TCP port for the terminal gateway and picking a usable
//! interactive shell for the host platform.

pub mod config;
pub mod error;
pub mod port;
pub mod shell;

pub use config::Config;
pub use error::ConfigError;
