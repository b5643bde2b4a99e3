//! WebSocket snapshot feed
//!
//! `GET /ws` upgrades to a WebSocket. Each connection gets its own receiver
//! on the message bus and forwards every catalog snapshot as
//!
//! ```json
//! {"event": "updatedProducts", "version": 3, "action": "created", "id": 7, "products": [...], "published_at": 0}
//! ```
//!
//! Clients may send `{"event": "productList"}` to have the current catalog
//! broadcast to every subscriber. Nothing is sent on connect.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use http::Extensions;
use serde::Serialize;
use shared::message::SNAPSHOT_EVENT;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::ServerState;
use crate::message::{BusMessage, ClientRequest, EventType, MessageBus, SnapshotPayload};

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(subscribe))
}

/// Outbound snapshot frame
#[derive(Serialize)]
struct SnapshotFrame<'a> {
    event: &'static str,
    #[serde(flatten)]
    snapshot: &'a SnapshotPayload,
}

/// GET /ws
pub async fn subscribe(
    State(state): State<ServerState>,
    extensions: Extensions,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let addr = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    ws.on_upgrade(move |socket| handle_connection(socket, state, addr))
}

async fn handle_connection(socket: WebSocket, state: ServerState, addr: Option<SocketAddr>) {
    let bus = state.message_bus.clone();
    let client_id = bus.register_client(addr);
    // Subscribe before anything else so no snapshot published after the
    // upgrade is missed
    let mut snapshots = bus.subscribe();
    let shutdown = bus.shutdown_token().clone();
    let (mut ws_sink, mut ws_stream) = socket.split();

    tracing::info!(%client_id, ?addr, "WebSocket subscriber connected");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!(%client_id, "Closing subscriber for shutdown");
                break;
            }

            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_text(text.as_str(), &bus, client_id);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(%client_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Binary, Pong
                }
            }

            msg = snapshots.recv() => {
                match msg {
                    Ok(msg) => match encode_frame(&msg) {
                        Ok(Some(frame)) => {
                            if ws_sink.send(Message::Text(frame.into())).await.is_err() {
                                tracing::warn!(%client_id, "Failed to push snapshot, disconnecting");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!(%client_id, error = %e, "Failed to encode snapshot frame");
                        }
                    },
                    // Every snapshot is the full catalog, the next one catches up
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%client_id, skipped, "Subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    bus.unregister_client(&client_id);
    tracing::info!(%client_id, "WebSocket subscriber disconnected");
}

/// Forward a client request to the server-side handler
fn handle_client_text(text: &str, bus: &MessageBus, client_id: Uuid) {
    let request: ClientRequest = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(%client_id, "Invalid client message: {e}");
            return;
        }
    };

    let result = BusMessage::request(&request)
        .map_err(|e| crate::utils::AppError::internal(e.to_string()))
        .and_then(|msg| bus.send_to_server(msg));
    if let Err(e) = result {
        tracing::warn!(%client_id, error = %e, "Failed to forward client request");
    }
}

/// Render a bus message as a WebSocket text frame
///
/// Only snapshots are forwarded; other event types yield `None`.
fn encode_frame(msg: &BusMessage) -> Result<Option<String>, serde_json::Error> {
    if msg.event_type != EventType::Sync {
        return Ok(None);
    }
    let snapshot: SnapshotPayload = msg.parse_payload()?;
    let frame = SnapshotFrame {
        event: SNAPSHOT_EVENT,
        snapshot: &snapshot,
    };
    serde_json::to_string(&frame).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::SyncAction;
    use serde_json::Value;

    #[test]
    fn test_snapshot_frame_shape() {
        let payload = SnapshotPayload {
            version: 4,
            action: SyncAction::Deleted,
            id: Some(1),
            products: vec![],
            published_at: 1_700_000_000_000,
        };
        let frame = encode_frame(&BusMessage::sync(&payload).unwrap())
            .unwrap()
            .unwrap();

        let json: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(json["event"], "updatedProducts");
        assert_eq!(json["version"], 4);
        assert_eq!(json["action"], "deleted");
        assert_eq!(json["id"], 1);
        assert_eq!(json["products"], Value::Array(vec![]));
    }

    #[test]
    fn test_non_snapshot_messages_are_not_forwarded() {
        let msg = BusMessage::request(&ClientRequest::ProductList).unwrap();
        assert_eq!(encode_frame(&msg).unwrap(), None);
    }

    #[tokio::test]
    async fn test_client_request_reaches_server_channel() {
        let bus = MessageBus::new();
        let mut server_rx = bus.subscribe_to_clients();

        handle_client_text(r#"{"event":"productList"}"#, &bus, Uuid::new_v4());

        let msg = server_rx.recv().await.unwrap();
        assert_eq!(msg.event_type, EventType::RequestCommand);
        let request: ClientRequest = msg.parse_payload().unwrap();
        assert_eq!(request, ClientRequest::ProductList);
    }

    #[tokio::test]
    async fn test_unknown_client_event_is_dropped() {
        let bus = MessageBus::new();
        let mut server_rx = bus.subscribe_to_clients();

        handle_client_text(r#"{"event":"somethingElse"}"#, &bus, Uuid::new_v4());

        assert!(matches!(
            server_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
