//! Message bus core
//!
//! # Message flow
//!
//! ```text
//! WebSocket client ──▶ send_to_server() ──▶ client_tx ──▶ MessageHandler
//!                                                            │
//! ChangeNotifier ───▶ publish() ──────────▶ server_tx ◀───────┘
//!                                               │
//!                                               ▼
//!                                   one Receiver per connection
//! ```
//!
//! Fan-out is a `tokio::sync::broadcast` channel: publishing only enqueues,
//! every connection task drains its own receiver. A slow connection lags and
//! loses frames without holding back the others.

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use shared::util::now_millis;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::notifier::SnapshotSink;
use crate::utils::AppError;

/// Default capacity of the broadcast channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A connected subscriber, as seen by the bus
#[derive(Debug, Clone)]
struct ConnectedClient {
    addr: Option<SocketAddr>,
    connected_at: i64,
}

/// Message bus - routes snapshots to subscribers and client requests to the server
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// client -> server
    client_tx: broadcast::Sender<BusMessage>,
    /// server -> every client
    server_tx: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
    /// Connected subscribers (owned by the transport shell)
    clients: Arc<DashMap<Uuid, ConnectedClient>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Publish to every subscriber (server -> clients)
    ///
    /// Returns the number of receivers the message was queued for. Having no
    /// subscribers is not an error.
    pub fn publish(&self, msg: BusMessage) -> Result<usize, AppError> {
        if self.server_tx.receiver_count() == 0 {
            return Ok(0);
        }
        self.server_tx
            .send(msg)
            .map_err(|e| AppError::internal(format!("Broadcast failed: {}", e)))
    }

    /// Send a message to the server (client -> server)
    pub fn send_to_server(&self, msg: BusMessage) -> Result<(), AppError> {
        self.client_tx
            .send(msg)
            .map_err(|e| AppError::internal(format!("No server handler listening: {}", e)))?;
        Ok(())
    }

    /// Subscribe to client requests (server side)
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<BusMessage> {
        self.client_tx.subscribe()
    }

    /// Subscribe to server broadcasts (client side)
    ///
    /// Only messages published after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// Record a new connection and return its id
    pub fn register_client(&self, addr: Option<SocketAddr>) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(
            id,
            ConnectedClient {
                addr,
                connected_at: now_millis(),
            },
        );
        tracing::debug!(client_id = %id, ?addr, "Subscriber registered");
        id
    }

    /// Forget a connection
    pub fn unregister_client(&self, id: &Uuid) {
        if let Some((_, client)) = self.clients.remove(id) {
            tracing::debug!(
                client_id = %id,
                addr = ?client.addr,
                connected_ms = now_millis() - client.connected_at,
                "Subscriber unregistered"
            );
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Shutdown token (connection tasks watch it)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Cancel every task attached to the bus
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSink for MessageBus {
    fn publish(&self, msg: BusMessage) -> Result<usize, AppError> {
        MessageBus::publish(self, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{EventType, SnapshotPayload, SyncAction};

    fn snapshot() -> BusMessage {
        BusMessage::sync(&SnapshotPayload {
            version: 1,
            action: SyncAction::Refreshed,
            id: None,
            products: vec![],
            published_at: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = MessageBus::new();
        assert_eq!(bus.publish(snapshot()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = MessageBus::new();
        let mut r1 = bus.subscribe();
        let mut r2 = bus.subscribe();

        assert_eq!(bus.publish(snapshot()).unwrap(), 2);

        assert_eq!(r1.recv().await.unwrap().event_type, EventType::Sync);
        assert_eq!(r2.recv().await.unwrap().event_type, EventType::Sync);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let bus = MessageBus::new();
        let _early = bus.subscribe();
        bus.publish(snapshot()).unwrap();

        let mut late = bus.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_does_not_block_others() {
        let bus = MessageBus::with_capacity(2);
        let mut slow = bus.subscribe();
        let mut fast = bus.subscribe();

        for _ in 0..4 {
            bus.publish(snapshot()).unwrap();
            fast.recv().await.unwrap();
        }

        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn test_client_registry() {
        let bus = MessageBus::new();
        let a = bus.register_client(None);
        let b = bus.register_client(Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(bus.client_count(), 2);

        bus.unregister_client(&a);
        bus.unregister_client(&a);
        assert_eq!(bus.client_count(), 1);

        bus.unregister_client(&b);
        assert_eq!(bus.client_count(), 0);
    }
}
