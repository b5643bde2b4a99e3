//! Real-time notification plumbing
//!
//! - [`ChangeNotifier`] turns a product list into a versioned snapshot
//! - [`MessageBus`] fans snapshots out to every connected subscriber
//! - [`MessageHandler`] serves requests that subscribers send back

pub mod bus;
pub mod handler;
pub mod notifier;

pub use bus::MessageBus;
pub use handler::MessageHandler;
pub use notifier::{ChangeNotifier, SnapshotSink};
pub use shared::message::{BusMessage, ClientRequest, EventType, SnapshotPayload, SyncAction};
