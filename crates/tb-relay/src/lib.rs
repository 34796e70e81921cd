//! tb-relay: Relay client for termbridge
//!
//! Opens one upstream listener on the relay per configured routing key
//! and reverse-proxies the HTTP requests the relay forwards down that
//! listener to a local address. The listener is carried over a WebSocket;
//! request and response frames are bincode-encoded.
//!
//! Frames carry buffered HTTP request/response pairs only. Protocol
//! upgrades on forwarded requests (WebSocket included) are not passed
//! through a listener; interactive traffic needs a direct route to the
//! local address.

pub mod client;
pub mod error;
pub mod options;
pub mod protocol;

pub use client::RelayClient;
pub use error::RelayError;
pub use options::{ListenerBinding, RelayOptions};
