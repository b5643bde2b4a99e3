//! Server-side processing of client requests
//!
//! The handler subscribes to the client channel of the [`MessageBus`] and
//! answers requests that subscribers send over their socket. The only request
//! today is `productList`, answered by broadcasting the current snapshot to
//! every subscriber.
//!
//! [`MessageBus`]: super::MessageBus

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::catalog::{CatalogService, run_blocking};
use crate::message::{BusMessage, ClientRequest, EventType};
use crate::utils::AppError;

pub struct MessageHandler {
    receiver: broadcast::Receiver<BusMessage>,
    shutdown_token: CancellationToken,
    catalog: CatalogService,
}

impl MessageHandler {
    pub fn new(
        receiver: broadcast::Receiver<BusMessage>,
        shutdown_token: CancellationToken,
        catalog: CatalogService,
    ) -> Self {
        Self {
            receiver,
            shutdown_token,
            catalog,
        }
    }

    /// Process client messages until shutdown or until the channel closes
    pub async fn run(mut self) {
        tracing::info!("Message handler started");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Message handler shutting down");
                    break;
                }

                msg_result = self.receiver.recv() => {
                    match msg_result {
                        Ok(msg) => {
                            if let Err(e) = self.handle_message(&msg).await {
                                tracing::warn!(request_id = %msg.request_id, error = %e, "Failed to handle client message");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Message handler lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Client message channel closed");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Message handler stopped");
    }

    async fn handle_message(&self, msg: &BusMessage) -> Result<(), AppError> {
        match msg.event_type {
            EventType::RequestCommand => {
                let request: ClientRequest = msg.parse_payload().map_err(|e| {
                    AppError::invalid_request(format!("Malformed client request: {e}"))
                })?;
                self.handle_request(request).await
            }
            other => {
                tracing::debug!(event_type = %other, "Ignoring client message");
                Ok(())
            }
        }
    }

    async fn handle_request(&self, request: ClientRequest) -> Result<(), AppError> {
        match request {
            ClientRequest::ProductList => {
                tracing::debug!("Snapshot requested by client");
                let catalog = self.catalog.clone();
                run_blocking(move || catalog.refresh()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogService, ProductStorage};
    use crate::message::{MessageBus, SnapshotPayload, SyncAction};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_product_list_request_broadcasts_snapshot() {
        let bus = Arc::new(MessageBus::new());
        let storage = ProductStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new(storage, bus.clone());
        let mut subscriber = bus.subscribe();

        let handler = MessageHandler::new(
            bus.subscribe_to_clients(),
            bus.shutdown_token().clone(),
            catalog,
        );
        let task = tokio::spawn(handler.run());

        bus.send_to_server(BusMessage::request(&ClientRequest::ProductList).unwrap())
            .unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(5), subscriber.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.event_type, EventType::Sync);
        let snapshot: SnapshotPayload = msg.parse_payload().unwrap();
        assert_eq!(snapshot.action, SyncAction::Refreshed);
        assert!(snapshot.products.is_empty());

        bus.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_stops_on_shutdown() {
        let bus = Arc::new(MessageBus::new());
        let catalog = CatalogService::new(ProductStorage::open_in_memory().unwrap(), bus.clone());
        let handler = MessageHandler::new(
            bus.subscribe_to_clients(),
            bus.shutdown_token().clone(),
            catalog,
        );
        let task = tokio::spawn(handler.run());
        bus.shutdown();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
