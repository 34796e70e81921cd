//! Local port allocation
//!
//! Probes a bounded range for a TCP port the gateway can bind. Each
//! candidate is briefly bound and released, so the result is best-effort:
//! another process may grab the port between the probe and the real bind.
//! The consumers bind immediately after allocation, which keeps the window
//! small enough in practice.

use std::net::TcpListener;

/// First port probed, and the fallback when the whole range is taken.
pub const DEFAULT_PORT: u16 = 8080;

/// Number of consecutive ports probed.
const PROBE_SPAN: u16 = 100;

/// Find a free local TCP port, starting at [`DEFAULT_PORT`].
///
/// Never fails: when every port in the range is occupied this falls back
/// to [`DEFAULT_PORT`] and logs a warning, since the caller cannot tell
/// the fallback apart from a successful probe by the return value alone.
pub fn find_available_port() -> u16 {
    probe(DEFAULT_PORT, PROBE_SPAN)
}

fn probe(start: u16, span: u16) -> u16 {
    for port in start..start.saturating_add(span) {
        if is_port_available(port) {
            return port;
        }
    }
    tracing::warn!(
        start,
        span,
        "no free port in probe range, falling back to {}",
        start
    );
    start
}

fn is_port_available(port: u16) -> bool {
    // The listener is dropped (and the port released) as soon as the
    // binding succeeds.
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_within_probe_range() {
        let port = find_available_port();
        assert!((DEFAULT_PORT..DEFAULT_PORT + PROBE_SPAN).contains(&port));
    }

    #[test]
    fn allocated_port_is_bindable() {
        let port = find_available_port();
        // May race with other processes, but binding right after the probe
        // mirrors how the gateway consumes the allocation.
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[test]
    fn skips_occupied_ports() {
        // Occupy a small custom range except its last port.
        let start = 42710;
        let _a = TcpListener::bind(("127.0.0.1", start)).unwrap();
        let _b = TcpListener::bind(("127.0.0.1", start + 1)).unwrap();

        assert_eq!(probe(start, 3), start + 2);
    }

    #[test]
    fn exhausted_range_falls_back_to_start() {
        let start = 42720;
        let _a = TcpListener::bind(("127.0.0.1", start)).unwrap();
        let _b = TcpListener::bind(("127.0.0.1", start + 1)).unwrap();

        assert_eq!(probe(start, 2), start);
    }
}
