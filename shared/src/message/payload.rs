use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Product;

// ==================== Catalog Snapshot ====================

/// The mutation that produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
    /// Re-broadcast on client request, nothing changed
    Refreshed,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
            Self::Refreshed => write!(f, "refreshed"),
        }
    }
}

/// Full catalog snapshot (server -> all clients)
///
/// Always the complete ordered product list, never a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Monotonic snapshot version; clients drop frames older than the last seen
    pub version: u64,
    /// Mutation that triggered this snapshot
    pub action: SyncAction,
    /// Id of the product the mutation touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Current products in insertion order
    pub products: Vec<Product>,
    /// Publish time (UTC millis)
    pub published_at: i64,
}

// ==================== Client Requests ====================

/// Messages a connected client may send
///
/// Tagged by `event`, e.g. `{"event":"productList"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ClientRequest {
    /// Ask the server to broadcast the current catalog to everyone
    #[serde(rename = "productList")]
    ProductList,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_request_tag() {
        let req: ClientRequest = serde_json::from_str(r#"{"event":"productList"}"#).unwrap();
        assert_eq!(req, ClientRequest::ProductList);

        // Extra fields sent by older clients are ignored
        let req: ClientRequest =
            serde_json::from_str(r#"{"event":"productList","data":[1,2]}"#).unwrap();
        assert_eq!(req, ClientRequest::ProductList);

        assert!(serde_json::from_str::<ClientRequest>(r#"{"event":"nope"}"#).is_err());
    }

    #[test]
    fn test_sync_action_serde() {
        assert_eq!(
            serde_json::to_string(&SyncAction::Deleted).unwrap(),
            "\"deleted\""
        );
        assert_eq!(SyncAction::Refreshed.to_string(), "refreshed");
    }

    #[test]
    fn test_snapshot_omits_missing_id() {
        let payload = SnapshotPayload {
            version: 1,
            action: SyncAction::Refreshed,
            id: None,
            products: vec![],
            published_at: 0,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["action"], "refreshed");
    }
}
