//! WebSocket handling for badge notifications.
//!
//! The socket is push-only apart from keep-alives: the engine greets the
//! client, then forwards `badge_unlocked` messages for the connected user.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use waymark_domain::UserId;
use waymark_shared::{ClientMessage, ServerMessage};

use super::auth::AuthUser;
use super::connections::SharedConnectionManager;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub connections: SharedConnectionManager,
    /// Buffer size for each connection's outbound channel
    pub channel_buffer: usize,
}

/// WebSocket upgrade handler. Requires `X-User-Id`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
    AuthUser(user_id): AuthUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>, user_id: UserId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.channel_buffer);

    state
        .connections
        .register(connection_id, user_id.clone(), tx.clone())
        .await;

    tracing::info!(
        connection_id = %connection_id,
        user_id = %user_id,
        "WebSocket connection established"
    );

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                }
            }
        }
    });

    let _ = tx.try_send(ServerMessage::ConnectionEstablished {
        user_id: user_id.clone(),
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Some(reply) = handle_text(text.as_str(), connection_id) {
                    if tx.try_send(reply).is_err() {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Failed to send response, channel full or closed"
                        );
                    }
                }
            }
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.connections.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Reply to a text frame, if it warrants one.
fn handle_text(text: &str, connection_id: Uuid) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Ping) => Some(ServerMessage::Pong),
        Ok(ClientMessage::Unknown) => {
            tracing::debug!(connection_id = %connection_id, "Ignoring unknown client message");
            None
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
            Some(ServerMessage::error(
                "PARSE_ERROR",
                format!("Invalid message format: {e}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_gets_pong() {
        assert_eq!(
            handle_text(r#"{"type":"ping"}"#, Uuid::new_v4()),
            Some(ServerMessage::Pong)
        );
    }

    #[test]
    fn unknown_message_is_ignored() {
        assert_eq!(handle_text(r#"{"type":"subscribe"}"#, Uuid::new_v4()), None);
    }

    #[test]
    fn garbage_gets_parse_error() {
        match handle_text("not json", Uuid::new_v4()) {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "PARSE_ERROR"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
