//! Relay client errors

use std::time::Duration;
use thiserror::Error;

/// Errors from the relay client
#[derive(Error, Debug)]
pub enum RelayError {
    /// Opening an upstream listener did not finish in time
    #[error("Connection to {url} timed out after {timeout:?}")]
    ConnectTimeout { url: String, timeout: Duration },

    /// Opening an upstream listener failed
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// The relay closed an established upstream listener
    #[error("Relay connection lost: {0}")]
    ConnectionLost(String),

    /// WebSocket transport error on an established listener
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed wire frame
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Building the local forwarding client failed
    #[error("Forwarder error: {0}")]
    Forwarder(#[from] reqwest::Error),
}
