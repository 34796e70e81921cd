//! The gateway HTTP server
//!
//! One route, one behavior: upgrade to a WebSocket and bridge it to a
//! fresh PTY. Binary frames carry terminal bytes in both directions; a
//! small JSON text frame resizes the terminal. Cross-origin requests are
//! accepted from anywhere by construction: the gateway only ever listens
//! on loopback behind the relay.

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::options::{Credential, GatewayOptions};
use crate::pty::PtySession;

/// Resize control frame sent by clients as a text message
#[derive(Debug, Deserialize)]
struct ResizeFrame {
    rows: u16,
    cols: u16,
}

struct GatewayState {
    options: GatewayOptions,
    cancel: CancellationToken,
}

/// The terminal gateway server
pub struct GatewayServer {
    options: GatewayOptions,
}

impl GatewayServer {
    pub fn new(options: GatewayOptions) -> Self {
        Self { options }
    }

    /// Serve until the shared cancellation token fires.
    ///
    /// Failing to bind the configured address is a startup error;
    /// cancellation is a clean exit.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let bind_addr = self.options.bind_addr();
        let path = self.options.path.clone();
        let state = Arc::new(GatewayState {
            options: self.options,
            cancel: cancel.clone(),
        });

        let app = Router::new()
            .route(&path, get(ws_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind terminal gateway on {}", bind_addr))?;

        tracing::info!(addr = %bind_addr, %path, "terminal gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await
            .context("Terminal gateway server failed")?;

        tracing::info!("terminal gateway stopped");
        Ok(())
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(credential) = &state.options.credential {
        if !authorized(&headers, credential) {
            return (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"termbridge\"")],
                "authentication required",
            )
                .into_response();
        }
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn authorized(headers: &HeaderMap, credential: &Credential) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == credential.authorization_value())
        .unwrap_or(false)
}

async fn handle_socket(mut socket: WebSocket, state: Arc<GatewayState>) {
    tracing::info!("terminal client connected");

    let (mut session, reader) =
        match PtySession::spawn(&state.options.command, &state.options.args) {
            Ok(spawned) => spawned,
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn terminal session");
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        };

    let (output_tx, mut output_rx) = mpsc::channel::<Vec<u8>>(64);
    let reader_cancel = state.cancel.child_token();
    let reader_task = spawn_pty_reader(reader, output_tx, reader_cancel.clone());

    loop {
        tokio::select! {
            _ = state.cancel.cancelled() => break,

            output = output_rx.recv() => match output {
                Some(data) => {
                    if socket.send(Message::Binary(data)).await.is_err() {
                        break;
                    }
                }
                // Reader finished: the shell exited or the PTY closed.
                None => break,
            },

            msg = socket.recv() => match msg {
                Some(Ok(Message::Binary(data))) => {
                    if !state.options.permit_write {
                        continue;
                    }
                    if let Err(e) = session.write(&data) {
                        tracing::error!(error = %e, "terminal write failed");
                        break;
                    }
                }
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ResizeFrame>(&text) {
                        Ok(frame) => {
                            if let Err(e) = session.resize(frame.rows, frame.cols) {
                                tracing::warn!(error = %e, "terminal resize failed");
                            }
                        }
                        Err(e) => tracing::debug!(error = %e, "ignoring malformed control frame"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "websocket error");
                    break;
                }
            },
        }
    }

    reader_cancel.cancel();
    session.kill();
    let _ = tokio::time::timeout(std::time::Duration::from_millis(500), reader_task).await;
    let _ = socket.send(Message::Close(None)).await;

    tracing::info!("terminal client disconnected");
}

/// Read PTY output on a blocking task and hand it to the socket loop.
///
/// The token is checked between reads so the task exits promptly when the
/// connection or the whole service goes down.
fn spawn_pty_reader(
    mut reader: Box<dyn Read + Send>,
    tx: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; 4096];

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match reader.read(&mut buf) {
                // EOF: the shell exited
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    if !cancel.is_cancelled() {
                        tracing::debug!(error = %e, "PTY reader stopped");
                    }
                    break;
                }
            }
        }
    })
}
