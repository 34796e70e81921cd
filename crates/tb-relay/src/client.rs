//! The relay client
//!
//! Connection and serving are split: [`RelayClient::connect`] opens every
//! upstream listener and fails fast when the relay is unreachable, while
//! [`RelayClient::run`] serves the listeners until the shared cancellation
//! token fires or a listener is lost.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::RelayError;
use crate::options::{ListenerBinding, RelayOptions};
use crate::protocol::{self, UpstreamRequest, UpstreamResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Timeout for each forwarded local request
const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// A connected relay client with every upstream listener open
#[derive(Debug)]
pub struct RelayClient {
    options: RelayOptions,
    listeners: Vec<(ListenerBinding, WsStream)>,
}

impl RelayClient {
    /// Open one upstream listener per configured binding.
    ///
    /// Any listener failing to open within the connect timeout is a fatal
    /// startup error.
    pub async fn connect(options: RelayOptions) -> Result<Self, RelayError> {
        let mut listeners = Vec::with_capacity(options.listeners.len());

        for binding in &options.listeners {
            let url = options.upstream_url(&binding.endpoint);
            tracing::info!(endpoint = %binding.endpoint, %url, "opening upstream listener");

            let connected = tokio::time::timeout(options.connect_timeout, connect_async(url.as_str()))
                .await
                .map_err(|_| RelayError::ConnectTimeout {
                    url: url.clone(),
                    timeout: options.connect_timeout,
                })?;
            let (ws, _response) = connected.map_err(|source| RelayError::Connect {
                url: url.clone(),
                source,
            })?;

            tracing::info!(
                endpoint = %binding.endpoint,
                forward = %binding.forward_addr,
                "upstream listener open"
            );
            listeners.push((binding.clone(), ws));
        }

        Ok(Self { options, listeners })
    }

    /// Serve all listeners until shared cancellation or a listener loss.
    ///
    /// Cancellation is a clean exit: in-flight forwards get up to the
    /// grace period to complete. Losing a listener is an error; the other
    /// listeners are drained first via a child token.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), RelayError> {
        let http = reqwest::Client::builder()
            .timeout(FORWARD_TIMEOUT)
            .build()?;

        // Child so one lost listener can stop its siblings without
        // firing the service-wide token.
        let local = cancel.child_token();
        let grace = self.options.grace_period;

        let mut set = JoinSet::new();
        for (binding, ws) in self.listeners {
            set.spawn(serve_listener(
                ws,
                binding,
                http.clone(),
                local.clone(),
                grace,
                TaskTracker::new(),
            ));
        }

        let mut first_err = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                        local.cancel();
                    }
                }
                Err(join_err) => {
                    if first_err.is_none() {
                        first_err = Some(RelayError::ConnectionLost(join_err.to_string()));
                        local.cancel();
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// The tracker drops completed forwards as they finish, so it only ever
// holds the ones still in flight.
async fn serve_listener(
    ws: WsStream,
    binding: ListenerBinding,
    http: reqwest::Client,
    cancel: CancellationToken,
    grace: Duration,
    inflight: TaskTracker,
) -> Result<(), RelayError> {
    let (mut sink, mut stream) = ws.split();
    let (response_tx, mut response_rx) = mpsc::channel::<UpstreamResponse>(64);

    let result = loop {
        tokio::select! {
            _ = cancel.cancelled() => break Ok(()),

            response = response_rx.recv() => {
                // Senders live in this function; the channel cannot close first.
                if let Some(response) = response {
                    let frame = match protocol::encode_response(&response) {
                        Ok(frame) => frame,
                        Err(e) => break Err(e),
                    };
                    if let Err(e) = sink.send(Message::Binary(frame.into())).await {
                        break Err(RelayError::Transport(e));
                    }
                }
            }

            msg = stream.next() => match msg {
                Some(Ok(Message::Binary(data))) => {
                    let request = match protocol::decode_request(&data) {
                        Ok(request) => request,
                        Err(e) => {
                            tracing::warn!(endpoint = %binding.endpoint, error = %e, "dropping malformed frame");
                            continue;
                        }
                    };

                    tracing::debug!(
                        endpoint = %binding.endpoint,
                        id = request.id,
                        method = %request.method,
                        path = %request.path,
                        "forwarding request"
                    );

                    let http = http.clone();
                    let forward_addr = binding.forward_addr.clone();
                    let tx = response_tx.clone();
                    inflight.spawn(async move {
                        let response = forward(&http, &forward_addr, request).await;
                        let _ = tx.send(response).await;
                    });
                }
                Some(Ok(Message::Close(_))) | None => {
                    break Err(RelayError::ConnectionLost(format!(
                        "relay closed listener {}",
                        binding.endpoint
                    )));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(RelayError::Transport(e)),
            },
        }
    };

    // Let in-flight forwards finish within the grace period; their
    // responses are lost if the listener itself is gone.
    inflight.close();
    if tokio::time::timeout(grace, inflight.wait()).await.is_err() {
        tracing::warn!(endpoint = %binding.endpoint, "grace period elapsed with forwards in flight");
    }
    let _ = sink.send(Message::Close(None)).await;

    result
}

/// Forward one relayed request to the local address.
///
/// Forwarding failures are answered with a 502 rather than tearing the
/// listener down: transient local errors are the gateway's to log.
async fn forward(
    http: &reqwest::Client,
    forward_addr: &str,
    request: UpstreamRequest,
) -> UpstreamResponse {
    let url = format!("http://{}{}", forward_addr, request.path);
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .unwrap_or(reqwest::Method::GET);

    let mut builder = http.request(method, &url);
    for (name, value) in &request.headers {
        // The forwarder sets its own host and connection headers.
        if name.eq_ignore_ascii_case("host") || name.eq_ignore_ascii_case("connection") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }

    match builder.body(request.body).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read forwarded response body");
                    Vec::new()
                }
            };
            UpstreamResponse {
                id: request.id,
                status,
                headers,
                body,
            }
        }
        Err(e) => {
            tracing::warn!(%url, error = %e, "local forward failed");
            UpstreamResponse {
                id: request.id,
                status: 502,
                headers: vec![],
                body: e.to_string().into_bytes(),
            }
        }
    }
}
