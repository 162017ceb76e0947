//! Per-connection WebSocket lifecycle.
//!
//! Each connection runs two tasks: a writer task that owns the sink and
//! drains a bounded outbound queue, and the read loop below. Turns are
//! strictly sequential: the next inbound frame is not read until the current
//! turn has produced (or suppressed) its outbound frame.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use agora_core::{ProjectId, SessionId};

use crate::orchestrator::Orchestrator;
use crate::store::SessionStore;

/// Drive one connection until the socket closes, then evict its session.
pub async fn run(
    socket: WebSocket,
    session_id: SessionId,
    project_id: ProjectId,
    store: Arc<SessionStore>,
    orchestrator: Arc<Orchestrator>,
    outbound_queue_size: usize,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(outbound_queue_size);

    // Writer task: sole owner of the sink.
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    info!(session_id = %session_id, project_id = %project_id, "connection opened");

    while let Some(result) = ws_rx.next().await {
        let message = match result {
            Ok(message) => message,
            Err(error) => {
                debug!(session_id = %session_id, %error, "socket error, closing");
                break;
            }
        };
        match message {
            WsMessage::Text(text) => {
                let Some(frame) = orchestrator
                    .handle_text(&session_id, &project_id, text.as_str())
                    .await
                else {
                    continue;
                };
                if out_tx.send(frame).await.is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => break,
            // Ping/pong are answered by the protocol layer; binary frames
            // carry nothing in this protocol.
            _ => {}
        }
    }

    store.remove(&session_id);
    drop(out_tx);
    let _ = writer.await;
    info!(session_id = %session_id, "connection closed");
}
