//! tb-runtime: Lifecycle supervision for termbridge
//!
//! The service is a handful of independent long-running jobs (terminal
//! gateway, relay client, signal watcher, auto-exit timer) that are only
//! useful together. This crate provides the one policy the whole binary is
//! built around: run every registered [`Actor`] concurrently, and the
//! moment any one of them returns, cancel and drain all the others.
//!
//! A single [`CancellationToken`] is the shared shutdown signal. It fires
//! at most once, never resets, and every blocking wait in the workspace
//! races against it. A [`Supervisor`] is single-use: a new run requires a
//! new instance.

pub mod actor;
pub mod signal;
pub mod supervisor;
pub mod timeout;

pub use actor::Actor;
pub use supervisor::Supervisor;
