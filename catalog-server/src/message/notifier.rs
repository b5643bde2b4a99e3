//! Change notifier
//!
//! After every successful catalog mutation the store hands the full current
//! product list to [`ChangeNotifier::notify`], which wraps it in a versioned
//! [`SnapshotPayload`] and pushes it into a [`SnapshotSink`].
//!
//! The notifier never reports failure to its caller: a snapshot that cannot
//! be encoded or queued is logged and dropped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::message::{BusMessage, SnapshotPayload, SyncAction};
use shared::models::Product;
use shared::util::now_millis;

use crate::utils::AppError;

/// Publish capability handed to the catalog
///
/// The transport owns fan-out and per-subscriber delivery; implementors only
/// enqueue. Returns how many subscribers the message was queued for.
pub trait SnapshotSink: Send + Sync + fmt::Debug {
    fn publish(&self, msg: BusMessage) -> Result<usize, AppError>;
}

/// Builds snapshot messages and pushes them into the sink
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    sink: Arc<dyn SnapshotSink>,
    version: Arc<AtomicU64>,
}

impl ChangeNotifier {
    pub fn new(sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            sink,
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Version of the last snapshot handed to the sink (0 before the first)
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Publish the full product list
    ///
    /// Callers serialize calls (the catalog holds its write gate), so
    /// versions reach the sink in increasing order.
    pub fn notify(&self, action: SyncAction, id: Option<i64>, products: Vec<Product>) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let count = products.len();
        let payload = SnapshotPayload {
            version,
            action,
            id,
            products,
            published_at: now_millis(),
        };

        let msg = match BusMessage::sync(&payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!(version, %action, error = %e, "Failed to encode catalog snapshot");
                return;
            }
        };

        match self.sink.publish(msg) {
            Ok(receivers) => {
                tracing::debug!(version, %action, ?id, products = count, receivers, "Catalog snapshot published");
            }
            Err(e) => {
                tracing::warn!(version, %action, ?id, error = %e, "Catalog snapshot not delivered");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingSink, RecordingSink};
    use super::*;

    #[test]
    fn test_versions_increase() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = ChangeNotifier::new(sink.clone());

        notifier.notify(SyncAction::Created, Some(1), vec![]);
        notifier.notify(SyncAction::Deleted, Some(1), vec![]);

        let versions: Vec<u64> = sink.snapshots().iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(notifier.version(), 2);
    }

    #[test]
    fn test_failing_sink_is_swallowed() {
        let notifier = ChangeNotifier::new(Arc::new(FailingSink));
        notifier.notify(SyncAction::Updated, Some(3), vec![]);
        assert_eq!(notifier.version(), 1);
    }
}
