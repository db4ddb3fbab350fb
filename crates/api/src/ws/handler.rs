use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use hermas_events::Subscription;
use serde_json::json;

use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/entries/stream
///
/// Upgrades to a WebSocket that relays every entry change as JSON. Only
/// admins may subscribe; everyone else is rejected before the upgrade.
pub async fn entry_stream(
    RequireAdmin(user): RequireAdmin,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // Subscribe before upgrading so no event between the two is missed.
    let subscription = state.event_bus.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, state, user.user_id, subscription))
}

fn text(value: serde_json::Value) -> Message {
    Message::Text(Utf8Bytes::from(value.to_string()))
}

/// Manage a single stream connection after upgrade.
///
///   1. Registers the connection with `WsManager`.
///   2. Sends `{"type":"connected"}`.
///   3. Spawns a sender task that forwards control frames and bus events.
///   4. Drains inbound frames until the client goes away, then cleans up.
async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    user_id: hermas_core::types::DbId,
    mut subscription: Subscription,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "Entry stream connected");

    let mut control = state.ws_manager.add(conn_id.clone(), user_id).await;
    let (mut sink, mut stream) = socket.split();

    if sink.send(text(json!({ "type": "connected" }))).await.is_err() {
        state.ws_manager.remove(&conn_id).await;
        return;
    }

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                frame = control.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
                event = subscription.next() => match event {
                    Some(event) => text(event.to_wire()),
                    None => break,
                },
            };
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "Entry stream disconnected");
}
