//! termbridge: bridge a local shell to a remote relay endpoint
//!
//! The binary wires four long-running actors together: the relay client,
//! the terminal gateway, a signal watcher, and (optionally) an auto-exit
//! timer. [`service::Service`] owns that wiring behind an explicit,
//! single-instance handle.

pub mod service;

pub use service::Service;
