// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket Transport (§4.5): a background task owning the duplex
//! session, re-pointed at a real TLS endpoint from the Unix-socket event
//! bridge shape this is grounded in — `tokio::select!` over inbound
//! frames and outbound emits, `mpsc` channels at the boundary.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;

use warden_core::identity::AgentId;
use warden_wire::{AgentEvent, ServerEvent};

use crate::error::TransportError;

const PENDING_EMIT_CAPACITY: usize = 64;
const GRACEFUL_CLOSE_DEADLINE: Duration = Duration::from_secs(2);

/// What the connection loop reports back to the orchestrator. Mirrors
/// `ServerEvent` plus the transport's own lifecycle notices.
#[derive(Debug)]
pub enum ConnectionEvent {
    Server(ServerEvent),
    /// The socket dropped; the orchestrator should treat this as
    /// `CONNECTED -> DISCONNECTED` and decide on reconnection.
    Disconnected,
}

/// A live handle to the background connection task.
pub struct WebSocketHandle {
    emit_tx: mpsc::Sender<AgentEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl WebSocketHandle {
    /// Queues an outbound event. Drops silently (caller falls back to the
    /// offline queue) if the emit channel is full or the task has exited.
    pub async fn emit(&self, event: AgentEvent) -> bool {
        self.emit_tx.send(event).await.is_ok()
    }

    /// Graceful close: signals shutdown and waits up to a short deadline.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(GRACEFUL_CLOSE_DEADLINE, self.task).await;
    }
}

/// Connects to `url` presenting the handshake headers named in §4.5 and
/// spawns the event-bridge task. Returns once the TCP/TLS/WS handshake
/// itself succeeds; `auth_success`/`auth_failed` arrive as the first
/// `ConnectionEvent`s.
pub async fn connect(
    url: &str,
    agent_id: &AgentId,
    token: &str,
) -> Result<(WebSocketHandle, mpsc::Receiver<ConnectionEvent>), TransportError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| TransportError::WebSocketConnectionFailed(e.to_string()))?;
    {
        let headers = request.headers_mut();
        headers.insert(
            "x-client-type",
            "warden-agent".parse().map_err(|_| {
                TransportError::WebSocketConnectionFailed("invalid client-type header".into())
            })?,
        );
        headers.insert(
            "x-agent-id",
            agent_id.to_string().parse().map_err(|_| {
                TransportError::WebSocketConnectionFailed("invalid agent-id header".into())
            })?,
        );
        headers.insert(
            "authorization",
            format!("Bearer {token}").parse().map_err(|_| {
                TransportError::WebSocketConnectionFailed("invalid bearer header".into())
            })?,
        );
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| TransportError::WebSocketConnectionFailed(e.to_string()))?;

    let (event_tx, event_rx) = mpsc::channel(PENDING_EMIT_CAPACITY);
    let (emit_tx, emit_rx) = mpsc::channel(PENDING_EMIT_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(event_loop(stream, event_tx, emit_rx, shutdown_rx));

    Ok((WebSocketHandle { emit_tx, shutdown_tx: Some(shutdown_tx), task }, event_rx))
}

async fn event_loop<S>(
    stream: tokio_tungstenite::WebSocketStream<S>,
    event_tx: mpsc::Sender<ConnectionEvent>,
    mut emit_rx: mpsc::Receiver<AgentEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if event_tx.send(ConnectionEvent::Server(event)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(%e, "ws: unparseable server frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        let _ = event_tx.send(ConnectionEvent::Disconnected).await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%e, "ws: read error");
                        let _ = event_tx.send(ConnectionEvent::Disconnected).await;
                        break;
                    }
                }
            }
            outbound = emit_rx.recv() => {
                match outbound {
                    Some(event) => {
                        let Ok(body) = serde_json::to_string(&event) else { continue };
                        if write.send(Message::Text(body)).await.is_err() {
                            let _ = event_tx.send(ConnectionEvent::Disconnected).await;
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = &mut shutdown_rx => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
        }
    }
}

/// Exponential backoff with jitter between `initial` and `max`, bounded
/// by `max_attempts` (`None` = unbounded) — §4.5's reconnection policy.
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    max_attempts: Option<u32>,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration, max_attempts: Option<u32>) -> Self {
        Self { initial, max, max_attempts, attempt: 0 }
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// `None` once `max_attempts` is exhausted — the caller transitions
    /// to `OFFLINE`.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max_attempts) = self.max_attempts {
            if self.attempt >= max_attempts {
                return None;
            }
        }
        let exponent = self.attempt.min(16);
        self.attempt += 1;
        let base = self.initial.saturating_mul(1u32 << exponent).min(self.max);
        let jitter_ms = rand::thread_rng().gen_range(0..=(base.as_millis() as u64 / 4).max(1));
        Some(base + Duration::from_millis(jitter_ms))
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
