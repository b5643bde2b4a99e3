use std::sync::Arc;

use shared::util::now_millis;

use crate::catalog::{CatalogService, ProductStorage};
use crate::core::{Config, Result};
use crate::message::{MessageBus, MessageHandler};

/// Shared server state handed to every handler
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | catalog | product store with its change notifier |
/// | message_bus | snapshot fan-out and subscriber registry |
/// | started_at | process start (UTC millis) |
///
/// Cloning is cheap: every service is reference counted.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub catalog: CatalogService,
    pub message_bus: Arc<MessageBus>,
    pub started_at: i64,
}

impl ServerState {
    pub fn new(config: Config, storage: ProductStorage) -> Self {
        let message_bus = Arc::new(MessageBus::with_capacity(config.broadcast_capacity));
        let catalog = CatalogService::new(storage, message_bus.clone());
        Self {
            config,
            catalog,
            message_bus,
            started_at: now_millis(),
        }
    }

    /// Create the work dir and open the product database
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir()?;
        let db_path = config.database_path();
        let storage = ProductStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), products = storage.count()?, "Catalog database opened");
        Ok(Self::new(config.clone(), storage))
    }

    /// Spawn the client request handler
    pub fn start_background_tasks(&self) {
        let handler = MessageHandler::new(
            self.message_bus.subscribe_to_clients(),
            self.message_bus.shutdown_token().clone(),
            self.catalog.clone(),
        );
        tokio::spawn(handler.run());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("nested");
        let config = Config::with_overrides(work_dir.to_string_lossy(), 0);

        let state = ServerState::initialize(&config).unwrap();
        assert!(config.database_path().exists());
        assert_eq!(state.catalog.count().unwrap(), 0);
    }
}
