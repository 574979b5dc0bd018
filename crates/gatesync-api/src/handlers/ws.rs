//! Guardian WebSocket upgrade and session loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use gatesync_realtime::connection::ConnectionHandle;
use gatesync_realtime::message::{ClientEvent, ServerEvent};

use crate::state::AppState;

/// GET /ws — WebSocket upgrade.
///
/// The socket starts unauthenticated; the first useful client event must
/// be `authenticate` carrying a registered push token as the credential.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Runs one socket session from upgrade to close.
///
/// A single writer task owns the sink; both protocol replies and engine
/// room emissions are funneled through one outbound channel so ordering
/// stays sane.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<String>(32);
    let writer_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Set after a successful authenticate.
    let mut session: Option<Arc<ConnectionHandle>> = None;
    let mut forward_task: Option<tokio::task::JoinHandle<()>> = None;

    while let Some(result) = ws_rx.next().await {
        let message = match result {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let event: ClientEvent = match serde_json::from_str(text.as_str()) {
                    Ok(e) => e,
                    Err(_) => {
                        send_error(&out_tx, "Malformed client event").await;
                        continue;
                    }
                };

                match event {
                    ClientEvent::Authenticate { guardian_id, token } => {
                        let valid = state
                            .push_token_repo
                            .token_belongs_to(guardian_id, &token)
                            .await
                            .unwrap_or(false);
                        if !valid {
                            send_error(&out_tx, "Invalid socket credential").await;
                            continue;
                        }

                        // Refresh the token's last-used marker; failure
                        // here does not block the session.
                        if let Err(e) = state
                            .push_token_repo
                            .upsert(guardian_id, &token, None)
                            .await
                        {
                            warn!(guardian_id = %guardian_id, error = %e, "Token refresh failed");
                        }

                        // Re-authentication replaces the previous session.
                        if let Some(old) = session.take() {
                            state.realtime.unregister(old.id);
                        }
                        if let Some(task) = forward_task.take() {
                            task.abort();
                        }

                        let (handle, mut engine_rx) = state.realtime.register(guardian_id);
                        session = Some(handle);

                        let engine_out = out_tx.clone();
                        forward_task = Some(tokio::spawn(async move {
                            while let Some(msg) = engine_rx.recv().await {
                                if engine_out.send(msg).await.is_err() {
                                    break;
                                }
                            }
                        }));

                        let _ = out_tx
                            .send(ServerEvent::Authenticated { guardian_id }.to_wire())
                            .await;
                    }
                    ClientEvent::JoinRoom { room } => {
                        let Some(handle) = &session else {
                            send_error(&out_tx, "Authenticate first").await;
                            continue;
                        };
                        if let Err(e) = state.realtime.join_room(handle.id, &room) {
                            send_error(&out_tx, &e.message).await;
                        }
                    }
                }
            }
            Message::Close(_) => break,
            // Ping/pong answered by axum automatically.
            _ => {}
        }
    }

    if let Some(task) = forward_task.take() {
        task.abort();
    }
    if let Some(handle) = session.take() {
        state.realtime.unregister(handle.id);
        info!(guardian_id = %handle.guardian_id, "WebSocket session closed");
    }
    drop(out_tx);
    writer_task.abort();
}

async fn send_error(out_tx: &mpsc::Sender<String>, message: &str) {
    let _ = out_tx
        .send(
            ServerEvent::Error {
                message: message.to_string(),
            }
            .to_wire(),
        )
        .await;
}
