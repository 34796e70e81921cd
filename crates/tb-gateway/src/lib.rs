//! tb-gateway: Terminal-over-HTTP gateway
//!
//! Serves one route that upgrades to a WebSocket and bridges its binary
//! frames to a pseudo-terminal running the configured shell. The heavy
//! lifting (HTTP, WebSocket framing, PTY allocation) is delegated to axum
//! and portable-pty; this crate wires them together and enforces the
//! optional basic-auth credential on the route.

pub mod options;
pub mod pty;
pub mod server;

pub use options::{Credential, GatewayOptions};
pub use server::GatewayServer;
