//! Message bus message types
//!
//! Shared between the server and its subscribers. A [`BusMessage`] is the
//! unit the server fans out to every connected client; its payload is the
//! JSON encoding of one of the types in [`payload`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Name of the event clients receive when the catalog changes
pub const SNAPSHOT_EVENT: &str = "updatedProducts";

/// Message bus event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Client request
    RequestCommand,
    /// Catalog snapshot
    Sync,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::RequestCommand => write!(f, "request_command"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// Message bus envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            payload,
        }
    }

    /// Build a catalog snapshot message
    pub fn sync(payload: &SnapshotPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Sync, serde_json::to_vec(payload)?))
    }

    /// Build a client request message
    pub fn request(payload: &ClientRequest) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            EventType::RequestCommand,
            serde_json::to_vec(payload)?,
        ))
    }

    /// Decode the payload
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use rust_decimal::Decimal;

    fn product(id: i64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            description: "d".to_string(),
            price: Decimal::new(1050, 2),
            thumbnail: None,
            code: "c1".to_string(),
            category: "x".to_string(),
            stock: Decimal::new(5, 0),
            status: true,
        }
    }

    #[test]
    fn test_sync_message_carries_snapshot() {
        let payload = SnapshotPayload {
            version: 3,
            action: SyncAction::Created,
            id: Some(2),
            products: vec![product(1), product(2)],
            published_at: 0,
        };
        let msg = BusMessage::sync(&payload).unwrap();
        assert_eq!(msg.event_type, EventType::Sync);

        let decoded: SnapshotPayload = msg.parse_payload().unwrap();
        assert_eq!(decoded.version, 3);
        assert_eq!(decoded.products.len(), 2);
        assert_eq!(decoded.products[1].id, 2);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = BusMessage::new(EventType::Sync, vec![]);
        let b = BusMessage::new(EventType::Sync, vec![]);
        assert_ne!(a.request_id, b.request_id);
    }
}
