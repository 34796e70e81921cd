//! Relay client construction options

use std::time::Duration;

/// Timeout for opening each upstream listener
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long in-flight forwards may finish after cancellation
pub const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// One upstream listener: a routing key on the relay mapped to a local
/// forward address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerBinding {
    /// Routing key registered on the relay
    pub endpoint: String,

    /// `host:port` the relayed requests are forwarded to
    pub forward_addr: String,
}

/// Options for the relay client
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Relay connect URL, always scheme-prefixed
    pub connect_url: String,

    /// Timeout for opening each upstream listener
    pub connect_timeout: Duration,

    /// Upstream listeners to open
    pub listeners: Vec<ListenerBinding>,

    /// Drain budget for in-flight forwards on shutdown
    pub grace_period: Duration,
}

impl RelayOptions {
    /// Build options for a relay address, with the standard timeouts.
    ///
    /// Bare `host:port` addresses get an `http://` prefix.
    pub fn new(remote: &str, listeners: Vec<ListenerBinding>) -> Self {
        Self {
            connect_url: normalize_connect_url(remote),
            connect_timeout: CONNECT_TIMEOUT,
            listeners,
            grace_period: GRACE_PERIOD,
        }
    }

    /// WebSocket URL of the upstream listener for `endpoint`
    pub fn upstream_url(&self, endpoint: &str) -> String {
        let base = self.connect_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/v1/upstream/{}", base, endpoint)
    }
}

fn normalize_connect_url(remote: &str) -> String {
    if remote.starts_with("http") {
        remote.to_string()
    } else {
        format!("http://{}", remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> ListenerBinding {
        ListenerBinding {
            endpoint: "alice".to_string(),
            forward_addr: "127.0.0.1:8080".to_string(),
        }
    }

    #[test]
    fn bare_address_gets_http_prefix() {
        let options = RelayOptions::new("example.com:8022", vec![binding()]);
        assert_eq!(options.connect_url, "http://example.com:8022");
    }

    #[test]
    fn scheme_prefixed_address_is_kept() {
        let options = RelayOptions::new("https://example.com:8022", vec![binding()]);
        assert_eq!(options.connect_url, "https://example.com:8022");
    }

    #[test]
    fn upstream_url_switches_to_websocket_scheme() {
        let options = RelayOptions::new("example.com:8022", vec![binding()]);
        assert_eq!(
            options.upstream_url("alice"),
            "ws://example.com:8022/v1/upstream/alice"
        );

        let tls = RelayOptions::new("https://example.com:8022", vec![binding()]);
        assert_eq!(
            tls.upstream_url("alice"),
            "wss://example.com:8022/v1/upstream/alice"
        );
    }

    #[test]
    fn standard_timeouts_apply() {
        let options = RelayOptions::new("example.com:8022", vec![binding()]);
        assert_eq!(options.connect_timeout, Duration::from_secs(30));
        assert_eq!(options.grace_period, Duration::from_secs(30));
    }
}
